//! Chroma common types and byte-stream encoding.
//!
//! This crate provides the foundational data shared by the VM, the
//! assembler and the CLI:
//!
//! - [`Opcode`]: the 22 opcodes and their operand shapes
//! - [`ExceptionType`]: user-catchable exception codes raised by the VM
//! - [`Program`]: an immutable byte stream with instruction stepping
//! - [`pixels`]: the 2-bit-per-channel RGBA codec that carries programs
//!   inside images
//! - [`DecodeError`] / [`PixelError`]: errors from the above

pub mod error;
pub mod exception;
pub mod opcode;
pub mod pixels;
pub mod program;

// Re-export commonly used types at the crate root.
pub use error::{DecodeError, PixelError};
pub use exception::ExceptionType;
pub use opcode::Opcode;
pub use program::Program;
