//! File header (first 0x100 bytes)
//!
//! Only written when creating a database from scratch; merging leaves the
//! header untouched and never interprets it.
//!
//! ```text
//! [0x00] vendor    32 bytes, 0x07 "Analogue-Co", NUL padded
//! [0x20] database  32 bytes, "Analogue-3D.labels", NUL padded
//! [0x40] format    4 bytes, 00 00 02 00
//! [0x44] reserved  188 zero bytes
//! ```

use crate::error::FormatResult;
use crate::layout::{INDEX_OFFSET, INDEX_SENTINEL, MAX_INDEX_SLOTS};
use binrw::io::{Read, Seek, SeekFrom, Write};
use binrw::{BinRead, BinWrite, BinWriterExt};
use std::io::Cursor;

const VENDOR: &[u8] = b"\x07Analogue-Co";
const DATABASE: &[u8] = b"Analogue-3D.labels";
const FORMAT: [u8; 4] = [0x00, 0x00, 0x02, 0x00];

/// `labels.db` header
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct LabelsHeader {
    /// Vendor identification
    pub vendor: [u8; 32],
    /// Database identification
    pub database: [u8; 32],
    /// Format marker
    pub format: [u8; 4],
    /// Unused, zero
    pub reserved: [u8; 188],
}

impl Default for LabelsHeader {
    fn default() -> Self {
        let mut vendor = [0u8; 32];
        vendor[..VENDOR.len()].copy_from_slice(VENDOR);
        let mut database = [0u8; 32];
        database[..DATABASE.len()].copy_from_slice(DATABASE);
        Self {
            vendor,
            database,
            format: FORMAT,
            reserved: [0u8; 188],
        }
    }
}

impl LabelsHeader {
    /// Read the header from the start of a database
    pub fn parse<R: Read + Seek>(reader: &mut R) -> FormatResult<Self> {
        reader.seek(SeekFrom::Start(0))?;
        Ok(Self::read(reader)?)
    }

    /// Vendor field as text, without control bytes or padding
    pub fn vendor_name(&self) -> String {
        printable(&self.vendor)
    }

    /// Database field as text, without padding
    pub fn database_name(&self) -> String {
        printable(&self.database)
    }

    /// Check if the database field names a labels database
    pub fn is_labels_database(&self) -> bool {
        self.database.starts_with(DATABASE)
    }

    /// Serialize to exactly [`HEADER_SIZE`](crate::layout::HEADER_SIZE) bytes
    pub fn to_bytes(&self) -> FormatResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }
}

fn printable(field: &[u8]) -> String {
    String::from_utf8_lossy(field)
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

/// Write a database with no entries: header, then an index region of sentinels
///
/// The resulting file ends where the image table begins.
pub fn write_empty_database<W: Write + Seek>(writer: &mut W) -> FormatResult<()> {
    writer.seek(SeekFrom::Start(0))?;
    LabelsHeader::default().write(writer)?;

    writer.seek(SeekFrom::Start(INDEX_OFFSET))?;
    let mut region = Cursor::new(Vec::with_capacity(MAX_INDEX_SLOTS * 4));
    for _ in 0..MAX_INDEX_SLOTS {
        region.write_le(&INDEX_SENTINEL)?;
    }
    writer.write_all(region.get_ref())?;
    Ok(())
}
