//! Chroma virtual machine: executes raw byte streams.
//!
//! The VM is a stack-based machine with:
//! - An operand stack of `f64` values
//! - 256 variable slots and 256 function slots
//! - A call stack of return addresses
//! - A stack of open TRY scopes for structured exception handling
//!
//! Nothing is validated ahead of time. Unknown bytes are skipped; every
//! other problem is detected when the offending instruction runs.
//!
//! # Usage
//!
//! ```
//! use chroma_common::Program;
//! use chroma_vm::capture;
//!
//! // PUSH 5, PUSH 3, SUB, PRINTLN_NUM
//! let program = Program::new(vec![0x01, 5, 0x01, 3, 0x11, 0x62]);
//!
//! let run = capture(&program);
//! assert!(run.result.is_ok());
//! assert_eq!(run.output, "2\n");
//! ```

pub mod error;
pub mod exceptions;
pub mod execute;
pub mod machine;
pub mod stack;

pub use error::{Fault, FaultKind, RuntimeError};
pub use machine::VM;
pub use stack::OperandStack;

use std::io::Write;

use chroma_common::Program;

/// Execute a program on a fresh VM.
///
/// Printed text goes to `out`; a fault diagnostic goes to `err`.
///
/// # Errors
///
/// Returns [`RuntimeError`] if the program faults or a sink write fails.
pub fn run<O, E>(program: &Program, out: &mut O, err: &mut E) -> Result<(), RuntimeError>
where
    O: Write + ?Sized,
    E: Write + ?Sized,
{
    VM::new().run(program, out, err)
}

/// Everything a run produced, captured in memory.
#[derive(Debug)]
pub struct Capture {
    /// Text written by the PRINT opcodes.
    pub output: String,
    /// Diagnostic written on a fault, empty otherwise.
    pub diagnostics: String,
    /// How the run ended.
    pub result: Result<(), RuntimeError>,
}

/// Execute a program with both sinks captured into strings.
pub fn capture(program: &Program) -> Capture {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let result = run(program, &mut out, &mut err);
    Capture {
        output: String::from_utf8_lossy(&out).into_owned(),
        diagnostics: String::from_utf8_lossy(&err).into_owned(),
        result,
    }
}

/// Decimal text for a stack value.
///
/// Whole numbers print without a fractional part, zero prints as `0`
/// regardless of sign, and non-finite values print as `NaN`, `Infinity`
/// or `-Infinity`. Magnitudes of `1e21` and above, or below `1e-6`, switch
/// to exponent form with a signed exponent (`1.25e-7`, `1e+21`).
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if value == 0.0 {
        "0".to_string()
    } else if !(1e-6..1e21).contains(&value.abs()) {
        let text = format!("{value:e}");
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        }
    } else {
        value.to_string()
    }
}

/// Character for a stack value interpreted as a UTF-16 code unit.
///
/// The value is truncated toward zero and wrapped modulo 2^16, so `-1`
/// becomes U+FFFF and `65601` becomes `A`. Non-finite values map to U+0000
/// and lone surrogates to U+FFFD.
pub fn to_char(value: f64) -> char {
    let unit = if value.is_finite() {
        value.trunc().rem_euclid(65536.0) as u32
    } else {
        0
    };
    char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn number_formatting_extremes() {
        assert_eq!(format_number(2f64.powi(100)), "1.2676506002282294e+30");
        assert_eq!(format_number(1.0 / 200f64.powi(3)), "1.25e-7");
        assert_eq!(format_number(-1e21), "-1e+21");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(0.000001), "0.000001");
    }

    #[test]
    fn char_conversion() {
        assert_eq!(to_char(72.0), 'H');
        assert_eq!(to_char(10.0), '\n');
        assert_eq!(to_char(65.9), 'A');
        assert_eq!(to_char(0xD800 as f64), char::REPLACEMENT_CHARACTER);
    }

    #[test]
    fn char_conversion_wraps_to_sixteen_bits() {
        assert_eq!(to_char(-1.0), '\u{FFFF}');
        assert_eq!(to_char(65536.0 + 65.0), 'A');
        assert_eq!(to_char(-65.5), '\u{FFBF}');
        assert_eq!(to_char(f64::NAN), '\0');
        assert_eq!(to_char(f64::INFINITY), '\0');
    }
}
