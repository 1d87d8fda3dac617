//! Image to pixel block encoding
//!
//! Source images are decoded by content (the file extension is ignored),
//! normalized to 8-bit RGBA, stretched to 74x86 with a Lanczos filter and
//! written out as BGRA followed by the 0xFF padding.

use crate::merge::BlockResolver;
use crate::{LabelError, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use labeldb_formats::layout::{
    BLOCK_SIZE, BYTES_PER_PIXEL, LABEL_HEIGHT, LABEL_WIDTH, PADDING_BYTE,
};
use labeldb_formats::{FormatError, PixelBlock, Signature};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Resampling filter used for every label (Lanczos, 3 lobes)
pub const LABEL_FILTER: FilterType = FilterType::Lanczos3;

/// Encodes images into label pixel blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelEncoder;

impl PixelEncoder {
    /// Create an encoder
    pub const fn new() -> Self {
        Self
    }

    /// Encode a decoded image
    ///
    /// The image is resized to exactly 74x86 without keeping its aspect
    /// ratio; images already at that size are used as they are.
    pub fn encode(&self, image: &DynamicImage) -> Result<PixelBlock> {
        let rgba = image.to_rgba8();
        let resized = if rgba.dimensions() == (LABEL_WIDTH, LABEL_HEIGHT) {
            rgba
        } else {
            debug!(
                "Resampling {}x{} to {}x{}",
                rgba.width(),
                rgba.height(),
                LABEL_WIDTH,
                LABEL_HEIGHT
            );
            imageops::resize(&rgba, LABEL_WIDTH, LABEL_HEIGHT, LABEL_FILTER)
        };

        let mut bytes = vec![PADDING_BYTE; BLOCK_SIZE];
        for (x, y, pixel) in resized.enumerate_pixels() {
            let [r, g, b, a] = pixel.0;
            let offset = (y as usize * LABEL_WIDTH as usize + x as usize) * BYTES_PER_PIXEL;
            bytes[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&[b, g, r, a]);
        }

        Ok(PixelBlock::from_bytes(bytes)?)
    }

    /// Read and decode an image file
    pub fn decode_file(&self, path: &Path) -> Result<DynamicImage> {
        let data = std::fs::read(path).map_err(|e| LabelError::file(path, e))?;
        image::load_from_memory(&data).map_err(|source| LabelError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read, decode and encode an image file
    pub fn encode_file(&self, path: &Path) -> Result<PixelBlock> {
        info!("Loading {}", path.display());
        let image = self.decode_file(path)?;
        self.encode(&image)
    }

    /// Turn a stored block back into an RGBA image (padding dropped)
    pub fn decode_block(&self, block: &PixelBlock) -> Result<RgbaImage> {
        let rgba = block.to_rgba();
        let actual = rgba.len();
        RgbaImage::from_raw(LABEL_WIDTH, LABEL_HEIGHT, rgba).ok_or_else(|| {
            FormatError::InvalidBlockSize {
                expected: BLOCK_SIZE,
                actual,
            }
            .into()
        })
    }
}

impl BlockResolver<PathBuf> for PixelEncoder {
    type Error = LabelError;

    fn resolve(&mut self, _signature: Signature, source: &PathBuf) -> Result<PixelBlock> {
        self.encode_file(source)
    }
}
