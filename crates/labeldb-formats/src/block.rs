//! Fixed-size pixel blocks stored in the image table
//!
//! Each block is a flat byte stream of [`BLOCK_SIZE`] bytes:
//!
//! ```text
//! [0x0000] pixels   74 x 86 pixels, row-major from the top-left, 4 bytes each (B, G, R, A)
//! [0x6370] padding  0x90 bytes of 0xFF
//! ```

use crate::error::{FormatError, FormatResult};
use crate::layout::{
    BLOCK_SIZE, BYTES_PER_PIXEL, LABEL_HEIGHT, LABEL_WIDTH, PADDING_BYTE, PIXEL_BYTES,
};
use std::fmt;

/// One encoded label image
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBlock {
    bytes: Vec<u8>,
}

impl PixelBlock {
    /// Create a block with every pixel set to the given BGRA value
    pub fn filled(bgra: [u8; 4]) -> Self {
        let mut bytes = vec![PADDING_BYTE; BLOCK_SIZE];
        for pixel in bytes[..PIXEL_BYTES].chunks_exact_mut(BYTES_PER_PIXEL) {
            pixel.copy_from_slice(&bgra);
        }
        Self { bytes }
    }

    /// Wrap raw block bytes read from an image table
    pub fn from_bytes(bytes: Vec<u8>) -> FormatResult<Self> {
        if bytes.len() != BLOCK_SIZE {
            return Err(FormatError::InvalidBlockSize {
                expected: BLOCK_SIZE,
                actual: bytes.len(),
            });
        }
        Ok(Self { bytes })
    }

    /// Get the full block as stored on disk
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Get the BGRA pixel area
    pub fn pixel_bytes(&self) -> &[u8] {
        &self.bytes[..PIXEL_BYTES]
    }

    /// Get the trailing filler bytes
    pub fn padding(&self) -> &[u8] {
        &self.bytes[PIXEL_BYTES..]
    }

    /// Iterate over pixels in row-major order as `[B, G, R, A]`
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.pixel_bytes()
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Get the BGRA value at `(x, y)`, or `None` outside the label
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let start = Self::pixel_offset(x, y)?;
        let p = &self.bytes[start..start + BYTES_PER_PIXEL];
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Convert the pixel area to RGBA order
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(PIXEL_BYTES);
        for [b, g, r, a] in self.pixels() {
            rgba.extend_from_slice(&[r, g, b, a]);
        }
        rgba
    }

    fn pixel_offset(x: u32, y: u32) -> Option<usize> {
        if x >= LABEL_WIDTH || y >= LABEL_HEIGHT {
            return None;
        }
        Some((y as usize * LABEL_WIDTH as usize + x as usize) * BYTES_PER_PIXEL)
    }
}

impl fmt::Debug for PixelBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBlock")
            .field("len", &self.bytes.len())
            .field("first_pixel", &self.pixel(0, 0))
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_block_layout() {
        let block = PixelBlock::filled([1, 2, 3, 4]);
        assert_eq!(block.as_bytes().len(), BLOCK_SIZE);
        assert_eq!(block.pixels().count(), (LABEL_WIDTH * LABEL_HEIGHT) as usize);
        assert!(block.pixels().all(|p| p == [1, 2, 3, 4]));
        assert!(block.padding().iter().all(|&b| b == PADDING_BYTE));
        assert_eq!(block.padding().len(), 0x90);
    }

    #[test]
    fn test_pixel_addressing_is_row_major() {
        let mut bytes = PixelBlock::filled([0, 0, 0, 0]).as_bytes().to_vec();
        bytes[4..8].copy_from_slice(&[9, 9, 9, 9]);
        let row_one = LABEL_WIDTH as usize * BYTES_PER_PIXEL;
        bytes[row_one..row_one + 4].copy_from_slice(&[7, 7, 7, 7]);
        let block = PixelBlock::from_bytes(bytes).unwrap();

        assert_eq!(block.pixel(1, 0), Some([9, 9, 9, 9]));
        assert_eq!(block.pixel(0, 1), Some([7, 7, 7, 7]));
        assert_eq!(block.pixel(LABEL_WIDTH, 0), None);
        assert_eq!(block.pixel(0, LABEL_HEIGHT), None);
        assert_eq!(block.pixel(LABEL_WIDTH - 1, LABEL_HEIGHT - 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_from_bytes_checks_size() {
        let err = PixelBlock::from_bytes(vec![0; BLOCK_SIZE - 1]).unwrap_err();
        assert!(matches!(
            err,
            FormatError::InvalidBlockSize {
                expected: BLOCK_SIZE,
                actual
            } if actual == BLOCK_SIZE - 1
        ));

        let block = PixelBlock::from_bytes(vec![0xAB; BLOCK_SIZE]).unwrap();
        assert_eq!(block.as_bytes(), &vec![0xAB; BLOCK_SIZE][..]);
    }

    #[test]
    fn test_to_rgba_swaps_channels() {
        let block = PixelBlock::filled([0x10, 0x20, 0x30, 0x40]);
        let rgba = block.to_rgba();
        assert_eq!(rgba.len(), PIXEL_BYTES);
        assert_eq!(&rgba[..4], &[0x30, 0x20, 0x10, 0x40]);
    }
}
