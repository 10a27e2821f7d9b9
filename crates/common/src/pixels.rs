//! Pixel codec: one program byte per RGBA pixel.
//!
//! Each byte is split into four bit pairs stored in the two least
//! significant bits of the red, green, blue and alpha channels, high pair
//! first. The upper six bits of every channel belong to the cover image.

use crate::error::PixelError;

const LOW_BITS: u8 = 0b11;
const COVER_MASK: u8 = 0b1111_1100;

/// Recover the byte stream hidden in an RGBA pixel buffer.
///
/// Trailing bytes that do not form a whole pixel are ignored.
pub fn extract_bytes(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .map(|px| {
            ((px[0] & LOW_BITS) << 6)
                | ((px[1] & LOW_BITS) << 4)
                | ((px[2] & LOW_BITS) << 2)
                | (px[3] & LOW_BITS)
        })
        .collect()
}

/// Hide `bytecode` in a copy of `cover`, one byte per pixel.
///
/// `bytecode` must fill the image exactly and `cover` must be a
/// `width * height` RGBA buffer.
pub fn embed_bytes(
    bytecode: &[u8],
    cover: &[u8],
    width: usize,
    height: usize,
) -> Result<Vec<u8>, PixelError> {
    let pixel_count = width * height;
    if bytecode.len() != pixel_count {
        return Err(PixelError::SizeMismatch {
            len: bytecode.len(),
            width,
            height,
        });
    }
    if cover.len() != pixel_count * 4 {
        return Err(PixelError::CoverMismatch {
            len: cover.len(),
            expected: pixel_count * 4,
        });
    }

    let mut encoded: Vec<u8> = cover.iter().map(|c| c & COVER_MASK).collect();
    for (px, &byte) in encoded.chunks_exact_mut(4).zip(bytecode) {
        px[0] |= (byte >> 6) & LOW_BITS;
        px[1] |= (byte >> 4) & LOW_BITS;
        px[2] |= (byte >> 2) & LOW_BITS;
        px[3] |= byte & LOW_BITS;
    }
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_single_pixel() {
        // 0b01_10_11_00 spread across r, g, b, a
        let rgba = [0xFD, 0x02, 0x13, 0x80];
        assert_eq!(extract_bytes(&rgba), vec![0b01_10_11_00]);
    }

    #[test]
    fn extract_ignores_partial_pixel() {
        let rgba = [0, 0, 0, 1, 0xFF, 0xFF];
        assert_eq!(extract_bytes(&rgba), vec![1]);
    }

    #[test]
    fn embed_keeps_cover_high_bits() {
        let cover = [0xFF; 8];
        let encoded = embed_bytes(&[0x00, 0x62], &cover, 2, 1).unwrap();
        assert_eq!(&encoded[..4], &[0xFC, 0xFC, 0xFC, 0xFC]);
        // 0x62 = 01 10 00 10
        assert_eq!(&encoded[4..], &[0xFD, 0xFE, 0xFC, 0xFE]);
    }

    #[test]
    fn embed_rejects_wrong_length() {
        assert_eq!(
            embed_bytes(&[1, 2, 3], &[0; 16], 2, 2),
            Err(PixelError::SizeMismatch {
                len: 3,
                width: 2,
                height: 2
            })
        );
        assert_eq!(
            embed_bytes(&[1, 2, 3, 4], &[0; 12], 2, 2),
            Err(PixelError::CoverMismatch {
                len: 12,
                expected: 16
            })
        );
    }
}
