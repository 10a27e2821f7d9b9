//! Chroma CLI: assemble, run, and hide programs in images.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Usage/input/decode/assembly error
//! - 3: Runtime fault
//!
//! Logging goes to stderr and is filtered by `CHROMA_LOG` (falling back to
//! `RUST_LOG`). `--verbose` anywhere on the command line turns on debug
//! output when neither is set.

mod commands;

use std::process;

const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "debug";

fn main() {
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    args.retain(|a| a != "--verbose" && a != "-v");
    init_tracing(verbose);

    let Some(command) = args.first() else {
        print_usage();
        process::exit(1);
    };

    let rest = &args[1..];
    let result = match command.as_str() {
        "run" => commands::run(rest),
        "assemble" => commands::assemble(rest),
        "disassemble" => commands::disassemble(rest),
        "embed" => commands::embed(rest),
        "extract" => commands::extract(rest),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let default = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = std::env::var("CHROMA_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .and_then(|expr| EnvFilter::try_new(expr).ok())
        .unwrap_or_else(|| EnvFilter::new(default));

    let _ = fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn print_usage() {
    eprintln!("Usage: chroma <command> [args] [--verbose]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run <file> [--format bin|hex|rgba|png]          Execute a program");
    eprintln!("  assemble <input.chasm> [-o output.chb]          Assemble text to bytecode");
    eprintln!("  disassemble <file> [--format bin|hex|rgba|png]  Disassemble bytecode to text");
    eprintln!("  embed <prog> <cover.png> [-o out.png]           Hide bytecode in a PNG image");
    eprintln!("  embed <prog> <cover.rgba> <w> <h> [-o out]      Hide bytecode in a raw RGBA image");
    eprintln!("  extract <image.png|image.rgba> [-o output.chb]  Recover bytecode from an image");
}
