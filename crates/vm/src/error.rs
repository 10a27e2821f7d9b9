//! Runtime errors for the Chroma VM.
//!
//! Faults are host-fatal: they end the run and are reported once through
//! the error sink. Every fault records the opcode byte, the position of
//! that opcode, and the operand stack as it was when the fault happened.

use std::fmt;
use std::io;

use chroma_common::{ExceptionType, Opcode};
use thiserror::Error;

/// The kind of host-fatal fault.
///
/// Display renders the bare kind name used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FaultKind {
    /// Pop or peek on an empty operand stack.
    #[error("StackUnderflow")]
    StackUnderflow,

    /// An opcode needed an operand byte past the end of the program.
    #[error("MissingOperand")]
    MissingOperand,

    /// LOAD from a variable slot that was never stored.
    #[error("UndefinedVariable")]
    UndefinedVariable,

    /// CALL to a function slot that was never registered.
    #[error("UndefinedFunction")]
    UndefinedFunction,

    /// FUNC body has no RETURN before the end of the program.
    #[error("MissingReturn")]
    MissingReturn,

    /// CATCH executed with no open TRY scope.
    #[error("MisplacedCatch")]
    MisplacedCatch,

    /// TRY scope has no CATCH clause of its own.
    #[error("MissingCatch")]
    MissingCatch,

    /// A catch clause is not followed by another CATCH or an END_TRY.
    #[error("MissingCatchOrEndTry")]
    MissingCatchOrEndTry,

    /// A raised exception found no handler willing to accept it.
    #[error("UnhandledException")]
    UnhandledException(ExceptionType),
}

/// A fault together with the machine context it happened in.
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    /// What went wrong.
    pub kind: FaultKind,
    /// The opcode byte being executed.
    pub opcode: u8,
    /// Position of that opcode byte in the program.
    pub pc: usize,
    /// Operand stack contents, bottom first.
    pub stack: Vec<f64>,
}

impl Fault {
    pub(crate) fn new(kind: FaultKind, opcode: u8, pc: usize, stack: &[f64]) -> Self {
        Self {
            kind,
            opcode,
            pc,
            stack: stack.to_vec(),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InterpreterError: {}", self.kind)?;
        if let FaultKind::UnhandledException(exception) = self.kind {
            write!(f, " ({})", exception.name())?;
        }
        write!(
            f,
            " during {} ({:#04x}) operation at pc={}\n\t[",
            Opcode::name_of(self.opcode),
            self.opcode,
            self.pc
        )?;
        for (i, value) in self.stack.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&crate::format_number(*value))?;
        }
        f.write_str("]")
    }
}

impl std::error::Error for Fault {}

/// Errors returned to the host from a run.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The program faulted. The diagnostic has already been written to the
    /// error sink.
    #[error(transparent)]
    Fault(#[from] Fault),

    /// Writing to the text or error sink failed.
    #[error("failed to write to sink: {0}")]
    Sink(#[from] io::Error),
}

impl RuntimeError {
    /// The fault, if this error is one.
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            RuntimeError::Fault(fault) => Some(fault),
            RuntimeError::Sink(_) => None,
        }
    }

    /// The fault kind, if this error is a fault.
    pub fn kind(&self) -> Option<FaultKind> {
        self.fault().map(|fault| fault.kind)
    }
}

/// Why a handler stopped the dispatch loop.
#[derive(Debug)]
pub(crate) enum Trap {
    Fault(FaultKind),
    Sink(io::Error),
}

impl From<FaultKind> for Trap {
    fn from(kind: FaultKind) -> Self {
        Trap::Fault(kind)
    }
}

impl From<io::Error> for Trap {
    fn from(err: io::Error) -> Self {
        Trap::Sink(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_kind_names() {
        assert_eq!(FaultKind::StackUnderflow.to_string(), "StackUnderflow");
        assert_eq!(
            FaultKind::MissingCatchOrEndTry.to_string(),
            "MissingCatchOrEndTry"
        );
        assert_eq!(
            FaultKind::UnhandledException(ExceptionType::DIVISION_BY_ZERO).to_string(),
            "UnhandledException"
        );
    }

    #[test]
    fn diagnostic_line_format() {
        let fault = Fault::new(FaultKind::UndefinedVariable, 0x41, 1, &[]);
        assert_eq!(
            fault.to_string(),
            "InterpreterError: UndefinedVariable during LOAD (0x41) operation at pc=1\n\t[]"
        );
    }

    #[test]
    fn diagnostic_names_unhandled_exception() {
        let fault = Fault::new(
            FaultKind::UnhandledException(ExceptionType::DIVISION_BY_ZERO),
            0x13,
            4,
            &[1.0, 2.5],
        );
        assert_eq!(
            fault.to_string(),
            "InterpreterError: UnhandledException (DivisionByZero) during DIV (0x13) operation at pc=4\n\t[1, 2.5]"
        );
    }

    #[test]
    fn diagnostic_unknown_names() {
        let fault = Fault::new(
            FaultKind::UnhandledException(ExceptionType(0x09)),
            0xAB,
            2,
            &[],
        );
        assert!(fault
            .to_string()
            .starts_with("InterpreterError: UnhandledException (UNKNOWN_EXCEPTION) during UNKNOWN_OPCODE (0xab)"));
    }

    #[test]
    fn runtime_error_exposes_kind() {
        let err = RuntimeError::from(Fault::new(FaultKind::MissingReturn, 0x52, 0, &[]));
        assert_eq!(err.kind(), Some(FaultKind::MissingReturn));
        let sink = RuntimeError::from(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        assert_eq!(sink.kind(), None);
    }
}
