//! User-catchable exception types.
//!
//! Exception types are single bytes so that CATCH clauses can list them as
//! ordinary operands. Only [`ExceptionType::DIVISION_BY_ZERO`] is raised by
//! the VM today; any other byte is still a valid type to declare in a
//! CATCH clause.

use std::fmt;

/// Name reported for exception codes with no assigned meaning.
pub const UNKNOWN_EXCEPTION: &str = "UNKNOWN_EXCEPTION";

/// A raised exception type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExceptionType(pub u8);

impl ExceptionType {
    /// DIV or MOD with a zero divisor.
    pub const DIVISION_BY_ZERO: ExceptionType = ExceptionType(0x01);

    /// Every exception type with an assigned name.
    pub const KNOWN: [ExceptionType; 1] = [ExceptionType::DIVISION_BY_ZERO];

    /// The raw type byte.
    pub fn code(self) -> u8 {
        self.0
    }

    /// Human-readable name, or [`UNKNOWN_EXCEPTION`].
    pub fn name(self) -> &'static str {
        match self {
            ExceptionType::DIVISION_BY_ZERO => "DivisionByZero",
            _ => UNKNOWN_EXCEPTION,
        }
    }

    /// Look up an exception type by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<ExceptionType> {
        Self::KNOWN
            .iter()
            .find(|ty| ty.name().eq_ignore_ascii_case(name))
            .copied()
    }
}

impl From<u8> for ExceptionType {
    fn from(code: u8) -> Self {
        ExceptionType(code)
    }
}

impl fmt::Display for ExceptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
