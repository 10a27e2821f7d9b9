//! Opcode definitions for the Chroma instruction set.
//!
//! Each opcode is one byte. Operands are raw bytes (0–255) that follow the
//! opcode directly in the stream; how many is implied by the opcode.

use crate::error::DecodeError;

/// Identifies the operation to perform.
///
/// The `#[repr(u8)]` attribute ensures each variant has a stable byte value.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Stack
    /// Push the literal operand byte.
    Push = 0x01,
    /// Pop and discard the top of the stack.
    Pop = 0x02,
    /// Push a copy of the top of the stack.
    Dup = 0x03,

    // Arithmetic
    /// Pop two values, push their sum.
    Add = 0x10,
    /// Pop two values, push (second_popped - first_popped).
    Sub = 0x11,
    /// Pop two values, push their product.
    Mul = 0x12,
    /// Pop two values, push (second_popped / first_popped). Raises
    /// `DivisionByZero` when the divisor is zero.
    Div = 0x13,
    /// Pop two values, push the truncated remainder. Raises
    /// `DivisionByZero` when the divisor is zero.
    Mod = 0x14,
    /// Pop two values, push second_popped raised to first_popped.
    Exp = 0x15,

    // Control
    /// Stop execution.
    Halt = 0x32,

    // Variables
    /// Pop a value into variable slot `id`.
    Store = 0x40,
    /// Push the value of variable slot `id`.
    Load = 0x41,

    // Functions
    /// Call the function registered in slot `id`.
    Call = 0x50,
    /// Return to the caller, or halt at top level.
    Return = 0x51,
    /// Register a function body in slot `id` and skip over it.
    Func = 0x52,

    // I/O
    /// Pop and print a number.
    PrintNum = 0x60,
    /// Pop and print a character.
    PrintChar = 0x61,
    /// Pop and print a number followed by a newline.
    PrintlnNum = 0x62,
    /// Pop and print a character followed by a newline.
    PrintlnChar = 0x63,

    // Exception handling
    /// Open a handler scope.
    Try = 0x70,
    /// Catch clause: `count` followed by `count` exception type bytes.
    Catch = 0x71,
    /// Close the innermost handler scope.
    EndTry = 0x72,
}

/// All valid opcodes, in definition order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 22] = [
    Opcode::Push,
    Opcode::Pop,
    Opcode::Dup,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::Mod,
    Opcode::Exp,
    Opcode::Halt,
    Opcode::Store,
    Opcode::Load,
    Opcode::Call,
    Opcode::Return,
    Opcode::Func,
    Opcode::PrintNum,
    Opcode::PrintChar,
    Opcode::PrintlnNum,
    Opcode::PrintlnChar,
    Opcode::Try,
    Opcode::Catch,
    Opcode::EndTry,
];

/// Name reported for bytes that do not decode to an opcode.
pub const UNKNOWN_OPCODE: &str = "UNKNOWN_OPCODE";

impl TryFrom<u8> for Opcode {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Opcode::Push),
            0x02 => Ok(Opcode::Pop),
            0x03 => Ok(Opcode::Dup),

            0x10 => Ok(Opcode::Add),
            0x11 => Ok(Opcode::Sub),
            0x12 => Ok(Opcode::Mul),
            0x13 => Ok(Opcode::Div),
            0x14 => Ok(Opcode::Mod),
            0x15 => Ok(Opcode::Exp),

            0x32 => Ok(Opcode::Halt),

            0x40 => Ok(Opcode::Store),
            0x41 => Ok(Opcode::Load),

            0x50 => Ok(Opcode::Call),
            0x51 => Ok(Opcode::Return),
            0x52 => Ok(Opcode::Func),

            0x60 => Ok(Opcode::PrintNum),
            0x61 => Ok(Opcode::PrintChar),
            0x62 => Ok(Opcode::PrintlnNum),
            0x63 => Ok(Opcode::PrintlnChar),

            0x70 => Ok(Opcode::Try),
            0x71 => Ok(Opcode::Catch),
            0x72 => Ok(Opcode::EndTry),

            _ => Err(DecodeError::UnknownOpcode(value)),
        }
    }
}

impl Opcode {
    /// Returns the assembly mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::Dup => "DUP",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Mod => "MOD",
            Opcode::Exp => "EXP",
            Opcode::Halt => "HALT",
            Opcode::Store => "STORE",
            Opcode::Load => "LOAD",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::Func => "FUNC",
            Opcode::PrintNum => "PRINT_NUM",
            Opcode::PrintChar => "PRINT_CHAR",
            Opcode::PrintlnNum => "PRINTLN_NUM",
            Opcode::PrintlnChar => "PRINTLN_CHAR",
            Opcode::Try => "TRY",
            Opcode::Catch => "CATCH",
            Opcode::EndTry => "END_TRY",
        }
    }

    /// Look up an opcode by its mnemonic.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic() == mnemonic)
            .copied()
    }

    /// Number of operand bytes that always follow this opcode.
    ///
    /// CATCH reports 1 (its count byte); the `count` type bytes after it
    /// are variable and handled by [`crate::Program::step`].
    pub fn fixed_operands(&self) -> usize {
        match self {
            Opcode::Push
            | Opcode::Store
            | Opcode::Load
            | Opcode::Call
            | Opcode::Func
            | Opcode::Catch => 1,
            _ => 0,
        }
    }

    /// Mnemonic for an arbitrary byte, or [`UNKNOWN_OPCODE`].
    pub fn name_of(byte: u8) -> &'static str {
        Opcode::try_from(byte)
            .map(|op| op.mnemonic())
            .unwrap_or(UNKNOWN_OPCODE)
    }
}
