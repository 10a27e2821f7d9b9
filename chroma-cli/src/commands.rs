//! CLI command implementations.

use std::fs;
use std::io;
use std::path::Path;

use chroma_common::{pixels, Program};
use chroma_vm::RuntimeError;
use image::{ImageFormat, RgbaImage};
use tracing::debug;

/// How a program or image file is stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    /// Raw bytecode.
    Bin,
    /// Whitespace-separated hex listing.
    Hex,
    /// Raw RGBA pixel dump with the program in the low bits.
    Rgba,
    /// PNG image with the program in the low bits of its RGBA pixels.
    Png,
}

impl Format {
    fn parse(name: &str) -> Result<Format, i32> {
        match name {
            "bin" => Ok(Format::Bin),
            "hex" => Ok(Format::Hex),
            "rgba" => Ok(Format::Rgba),
            "png" => Ok(Format::Png),
            other => {
                eprintln!("error: unknown format '{other}' (expected bin, hex, rgba or png)");
                Err(1)
            }
        }
    }

    /// Guess from the file extension; anything unrecognized is raw bytecode.
    fn from_path(path: &str) -> Format {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("hex") => Format::Hex,
            Some("rgba") => Format::Rgba,
            Some("png") => Format::Png,
            _ => Format::Bin,
        }
    }
}

/// Decoded RGBA8 pixels.
#[derive(Debug)]
struct Image {
    rgba: Vec<u8>,
    width: usize,
    height: usize,
}

/// Execute a program. Output goes to stdout, a fault diagnostic to stderr.
pub fn run(args: &[String]) -> Result<(), i32> {
    let Some(input) = args.first() else {
        eprintln!("error: run requires an input file");
        eprintln!("Usage: chroma run <file> [--format bin|hex|rgba|png]");
        return Err(1);
    };

    let format = parse_format(input, &args[1..])?;
    let program = read_program(input, format)?;

    let stdout = io::stdout();
    let stderr = io::stderr();
    let result = chroma_vm::run(&program, &mut stdout.lock(), &mut stderr.lock());

    match result {
        Ok(()) => Ok(()),
        Err(RuntimeError::Fault(_)) => Err(3),
        Err(e @ RuntimeError::Sink(_)) => {
            eprintln!("error: {e}");
            Err(1)
        }
    }
}

/// Assemble a text file to raw bytecode.
pub fn assemble(args: &[String]) -> Result<(), i32> {
    let Some(input) = args.first() else {
        eprintln!("error: assemble requires an input file");
        eprintln!("Usage: chroma assemble <input.chasm> [-o output.chb]");
        return Err(1);
    };

    let output = output_flag(&args[1..])?.unwrap_or_else(|| with_extension(input, "chb"));

    let text = fs::read_to_string(input).map_err(|e| {
        eprintln!("error: cannot read '{input}': {e}");
        1
    })?;

    let program = chroma_assembler::assemble(&text).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    write_file(&output, program.as_bytes())?;
    eprintln!("assembled {} bytes -> {output}", program.len());
    Ok(())
}

/// Print the canonical assembly text of a program.
pub fn disassemble(args: &[String]) -> Result<(), i32> {
    let Some(input) = args.first() else {
        eprintln!("error: disassemble requires an input file");
        eprintln!("Usage: chroma disassemble <file> [--format bin|hex|rgba|png]");
        return Err(1);
    };

    let format = parse_format(input, &args[1..])?;
    let program = read_program(input, format)?;
    print!("{}", chroma_assembler::disassemble(&program));
    Ok(())
}

/// Hide a program in a cover image.
///
/// A PNG cover carries its own dimensions; a raw RGBA cover needs them on
/// the command line. The output is PNG when its path ends in `.png` and a
/// raw RGBA dump otherwise. Programs shorter than the image are padded
/// with zero bytes, which the VM skips.
pub fn embed(args: &[String]) -> Result<(), i32> {
    if args.len() < 2 {
        eprintln!("error: embed requires a program and a cover image");
        eprintln!("Usage: chroma embed <prog> <cover.png> [-o out.png]");
        eprintln!("       chroma embed <prog> <cover.rgba> <width> <height> [-o out.rgba]");
        return Err(1);
    }

    let (input, cover_path) = (&args[0], &args[1]);
    let (cover, rest) = match Format::from_path(cover_path) {
        Format::Png => (read_png(cover_path)?, &args[2..]),
        Format::Rgba if args.len() >= 4 => {
            let width = parse_dimension("width", &args[2])?;
            let height = parse_dimension("height", &args[3])?;
            let cover = Image {
                rgba: read_file(cover_path)?,
                width,
                height,
            };
            (cover, &args[4..])
        }
        Format::Rgba => {
            eprintln!("error: a raw RGBA cover needs a width and a height");
            return Err(1);
        }
        Format::Bin | Format::Hex => {
            eprintln!("error: cover '{cover_path}' must be a .png or .rgba image");
            return Err(1);
        }
    };

    let cover_ext = if Format::from_path(cover_path) == Format::Png { "png" } else { "rgba" };
    let output = output_flag(rest)?.unwrap_or_else(|| with_extension(input, cover_ext));

    let mut bytecode = read_program(input, Format::from_path(input))?.as_bytes().to_vec();
    let capacity = cover.width * cover.height;
    if bytecode.len() < capacity {
        debug!(len = bytecode.len(), capacity, "padding program");
        bytecode.resize(capacity, 0);
    }

    let encoded = pixels::embed_bytes(&bytecode, &cover.rgba, cover.width, cover.height)
        .map_err(|e| {
            eprintln!("error: {e}");
            1
        })?;
    let image = Image {
        rgba: encoded,
        width: cover.width,
        height: cover.height,
    };

    match Format::from_path(&output) {
        Format::Png => write_png(&output, image)?,
        _ => write_file(&output, &image.rgba)?,
    }
    eprintln!(
        "embedded {capacity} bytes in {}x{} image -> {output}",
        cover.width, cover.height
    );
    Ok(())
}

/// Recover bytecode from a PNG or raw RGBA image.
pub fn extract(args: &[String]) -> Result<(), i32> {
    let Some(input) = args.first() else {
        eprintln!("error: extract requires an input image");
        eprintln!("Usage: chroma extract <image.png|image.rgba> [-o output.chb]");
        return Err(1);
    };

    let output = output_flag(&args[1..])?.unwrap_or_else(|| with_extension(input, "chb"));
    let rgba = match Format::from_path(input) {
        Format::Png => read_png(input)?.rgba,
        _ => read_file(input)?,
    };
    let bytecode = pixels::extract_bytes(&rgba);

    write_file(&output, &bytecode)?;
    eprintln!("extracted {} bytes -> {output}", bytecode.len());
    Ok(())
}

// ---- Helpers ----

/// Load a program stored in `format`.
fn read_program(path: &str, format: Format) -> Result<Program, i32> {
    let program = match format {
        Format::Bin => Program::new(read_file(path)?),
        Format::Rgba => Program::new(pixels::extract_bytes(&read_file(path)?)),
        Format::Png => Program::new(pixels::extract_bytes(&read_png(path)?.rgba)),
        Format::Hex => {
            let text = fs::read_to_string(path).map_err(|e| {
                eprintln!("error: cannot read '{path}': {e}");
                1
            })?;
            Program::from_hex(&text).map_err(|e| {
                eprintln!("error: '{path}': {e}");
                1
            })?
        }
    };
    debug!(path, ?format, len = program.len(), "program loaded");
    Ok(program)
}

/// Decode a PNG of any color type into RGBA8.
fn read_png(path: &str) -> Result<Image, i32> {
    let bytes = read_file(path)?;
    let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
        .map_err(|e| {
            eprintln!("error: cannot decode '{path}': {e}");
            1
        })?
        .to_rgba8();

    let (width, height) = decoded.dimensions();
    debug!(path, width, height, "png decoded");
    Ok(Image {
        width: width as usize,
        height: height as usize,
        rgba: decoded.into_raw(),
    })
}

fn write_png(path: &str, image: Image) -> Result<(), i32> {
    let too_large = |_| {
        eprintln!("error: image too large for PNG");
        1
    };
    let width = u32::try_from(image.width).map_err(too_large)?;
    let height = u32::try_from(image.height).map_err(too_large)?;

    let Some(buffer) = RgbaImage::from_raw(width, height, image.rgba) else {
        eprintln!("error: pixel buffer does not match {width}x{height}");
        return Err(1);
    };
    buffer.save_with_format(path, ImageFormat::Png).map_err(|e| {
        eprintln!("error: cannot write '{path}': {e}");
        1
    })
}

fn read_file(path: &str) -> Result<Vec<u8>, i32> {
    fs::read(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })
}

fn write_file(path: &str, bytes: &[u8]) -> Result<(), i32> {
    fs::write(path, bytes).map_err(|e| {
        eprintln!("error: cannot write '{path}': {e}");
        1
    })
}

/// `--format NAME` among the trailing arguments, or a guess from `input`.
fn parse_format(input: &str, rest: &[String]) -> Result<Format, i32> {
    match rest {
        [] => Ok(Format::from_path(input)),
        [flag, name] if flag == "--format" => Format::parse(name),
        _ => {
            eprintln!("error: unexpected arguments: {}", rest.join(" "));
            Err(1)
        }
    }
}

/// `-o PATH` among the trailing arguments.
fn output_flag(rest: &[String]) -> Result<Option<String>, i32> {
    match rest {
        [] => Ok(None),
        [flag, path] if flag == "-o" => Ok(Some(path.clone())),
        _ => {
            eprintln!("error: unexpected arguments: {}", rest.join(" "));
            Err(1)
        }
    }
}

fn parse_dimension(name: &str, value: &str) -> Result<usize, i32> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => {
            eprintln!("error: invalid {name} '{value}'");
            Err(1)
        }
    }
}

fn with_extension(path: &str, ext: &str) -> String {
    Path::new(path).with_extension(ext).to_string_lossy().into_owned()
}
