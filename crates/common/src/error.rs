//! Decode and pixel-codec errors for Chroma byte streams.

use thiserror::Error;

/// Errors that occur while turning external input into a byte stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Byte does not name any opcode. The VM treats these as no-ops; only
    /// strict consumers (the assembler's opcode lookup) report it.
    #[error("unknown opcode: {0:#04x}")]
    UnknownOpcode(u8),

    /// A token in a hex listing is not a two-digit hex byte.
    #[error("invalid hex byte '{token}' at token {index}")]
    InvalidHex { index: usize, token: String },
}

/// Errors from packing bytes into pixel data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PixelError {
    /// The program does not fill the image exactly, one byte per pixel.
    #[error("bytecode length {len} does not match image size {width}x{height}")]
    SizeMismatch {
        len: usize,
        width: usize,
        height: usize,
    },

    /// The cover image buffer is not `width * height * 4` bytes long.
    #[error("cover image has {len} bytes, expected {expected}")]
    CoverMismatch { len: usize, expected: usize },
}
