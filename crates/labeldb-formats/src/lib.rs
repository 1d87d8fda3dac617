//! Parsers and builders for the Analogue 3D `labels.db` file
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::doc_markdown)] // Format terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
//! `labels.db` is a fixed-layout file holding one cartridge label image per
//! cartridge signature. This crate provides symmetric (parser and builder)
//! implementations for each of its regions.
//!
//! # File Layout
//!
//! ```text
//! 0x0000  header       0x100 bytes, vendor and database identification
//! 0x0100  key index    ascending u32 LE signatures, terminated by 0xFFFFFFFF
//! 0x4100  image table  one fixed-size pixel block per signature, same order
//! ```
//!
//! The Nth signature in the index owns the Nth block in the image table.
//! Blocks carry no key of their own, so the index and table must always be
//! rewritten together.
//!
//! # Example
//!
//! ```rust
//! use labeldb_formats::{ImageTable, KeyIndex, Signature, layout};
//! use std::io::Cursor;
//!
//! let mut file = Cursor::new(vec![0u8; layout::TABLE_OFFSET as usize + layout::BLOCK_SIZE]);
//!
//! let index = KeyIndex::new(vec![Signature::new(0x0304_0506)]);
//! index.write(&mut file, layout::MAX_INDEX_SLOTS)?;
//!
//! let parsed = KeyIndex::read(&mut file, layout::MAX_INDEX_SLOTS)?;
//! assert_eq!(parsed.signatures(), index.signatures());
//!
//! let table = ImageTable::read(&mut file, parsed.len())?;
//! assert_eq!(table.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

mod block;
mod error;
mod header;
mod index;
mod signature;
mod table;

pub use block::PixelBlock;
pub use error::{FormatError, FormatResult};
pub use header::{LabelsHeader, write_empty_database};
pub use index::KeyIndex;
pub use signature::Signature;
pub use table::{ImageTable, write_blocks};

/// Fixed offsets and record sizes of the `labels.db` file
pub mod layout {
    /// Size of the file header in bytes
    pub const HEADER_SIZE: usize = 0x100;

    /// File offset of the first signature in the key index
    pub const INDEX_OFFSET: u64 = 0x100;

    /// File offset of the first pixel block in the image table
    pub const TABLE_OFFSET: u64 = 0x4100;

    /// Word terminating the key index
    pub const INDEX_SENTINEL: u32 = 0xFFFF_FFFF;

    /// Size of one key index slot in bytes
    pub const INDEX_SLOT_SIZE: usize = 4;

    /// Number of 32-bit slots between the index start and the image table (4096)
    ///
    /// The sentinel occupies one slot, so at most `MAX_INDEX_SLOTS - 1`
    /// signatures can be written.
    pub const MAX_INDEX_SLOTS: usize = (TABLE_OFFSET - INDEX_OFFSET) as usize / INDEX_SLOT_SIZE;

    /// Label width in pixels
    pub const LABEL_WIDTH: u32 = 74;

    /// Label height in pixels
    pub const LABEL_HEIGHT: u32 = 86;

    /// Bytes per pixel (B, G, R, A)
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Bytes of pixel data at the start of each block
    pub const PIXEL_BYTES: usize = LABEL_WIDTH as usize * LABEL_HEIGHT as usize * BYTES_PER_PIXEL;

    /// Filler bytes after the pixel data of each block
    pub const BLOCK_PADDING: usize = 0x90;

    /// Value of every filler byte
    pub const PADDING_BYTE: u8 = 0xFF;

    /// Total size of one image table record (25,600 bytes)
    pub const BLOCK_SIZE: usize = PIXEL_BYTES + BLOCK_PADDING;
}

#[cfg(test)]
mod tests {
    use super::layout::*;

    #[test]
    fn test_layout_constants() {
        assert_eq!(MAX_INDEX_SLOTS, 4096);
        assert_eq!(PIXEL_BYTES, 25_456);
        assert_eq!(PIXEL_BYTES, 0x6370);
        assert_eq!(BLOCK_SIZE, 25_600);
        assert_eq!(BLOCK_SIZE, 0x6400);
        assert_eq!(INDEX_OFFSET as usize, HEADER_SIZE);
    }
}
