//! Program representation for Chroma byte streams.
//!
//! A program is a flat sequence of bytes with no header and no instruction
//! boundaries. Binary files (.chb) are the raw bytes; hex listings are
//! whitespace-separated two-digit hex bytes.

use crate::error::DecodeError;
use crate::opcode::Opcode;

/// A Chroma program: an immutable byte stream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    bytes: Vec<u8>,
}

impl Program {
    /// Create a new program from raw bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Parse a hex listing such as `"01 05 01 03 11 62"`.
    ///
    /// Tokens may be separated by any whitespace or commas and may carry a
    /// `0x` prefix. `#` starts a comment that runs to end of line.
    pub fn from_hex(text: &str) -> Result<Self, DecodeError> {
        let mut bytes = Vec::new();
        let tokens = text
            .lines()
            .map(|line| line.split('#').next().unwrap_or(""))
            .flat_map(|line| line.split(|c: char| c.is_whitespace() || c == ','))
            .filter(|token| !token.is_empty());

        for (index, token) in tokens.enumerate() {
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            if digits.is_empty() || digits.len() > 2 {
                return Err(DecodeError::InvalidHex {
                    index,
                    token: token.to_string(),
                });
            }
            let byte = u8::from_str_radix(digits, 16).map_err(|_| DecodeError::InvalidHex {
                index,
                token: token.to_string(),
            })?;
            bytes.push(byte);
        }

        Ok(Self { bytes })
    }

    /// Render the program as a hex listing, sixteen bytes per line.
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(self.bytes.len() * 3);
        for line in self.bytes.chunks(16) {
            let row: Vec<String> = line.iter().map(|b| format!("{b:02x}")).collect();
            out.push_str(&row.join(" "));
            out.push('\n');
        }
        out
    }

    /// The raw byte stream.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Byte at `pc`, if in range.
    pub fn get(&self, pc: usize) -> Option<u8> {
        self.bytes.get(pc).copied()
    }

    /// Number of bytes in the program.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the program has no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Position of the instruction that follows the one starting at `pc`.
    ///
    /// Unknown bytes are one byte wide. CATCH spans its count byte plus
    /// `count` type bytes. The result may lie past the end of the program
    /// when trailing operands are missing.
    pub fn step(&self, pc: usize) -> usize {
        let Some(byte) = self.get(pc) else {
            return pc + 1;
        };
        match Opcode::try_from(byte) {
            Ok(Opcode::Catch) => {
                let count = self.get(pc + 1).map_or(0, usize::from);
                pc + 2 + count
            }
            Ok(op) => pc + 1 + op.fixed_operands(),
            Err(_) => pc + 1,
        }
    }
}

impl From<Vec<u8>> for Program {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for Program {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}
