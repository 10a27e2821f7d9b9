//! Error types for the Chroma assembler.

use thiserror::Error;

/// Errors produced during assembly of text to bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// An unrecognized opcode mnemonic was encountered.
    #[error("line {line}: unknown opcode '{token}'")]
    UnknownOpcode { line: usize, token: String },

    /// A CATCH argument is neither a number nor a known exception name.
    #[error("line {line}: unknown exception type '{token}'")]
    UnknownException { line: usize, token: String },

    /// An opcode did not have enough arguments.
    #[error("line {line}: {opcode} expects {expected} argument(s)")]
    MissingArgument {
        line: usize,
        opcode: &'static str,
        expected: usize,
    },

    /// A numeric literal could not be parsed or does not fit in a byte.
    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    /// A token appeared where it was not expected.
    #[error("line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },

    /// CATCH lists more types than its count byte can hold.
    #[error("line {line}: CATCH lists {count} types (at most 255)")]
    TooManyTypes { line: usize, count: usize },
}
