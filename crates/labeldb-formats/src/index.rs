//! Key index parsing and building
//!
//! The key index starts at [`INDEX_OFFSET`] and is an array of little-endian
//! u32 signatures in strictly ascending order, terminated by a single
//! [`INDEX_SENTINEL`] word. Its capacity is bounded by the start of the image
//! table; the sentinel needs a slot of its own.

use crate::error::{FormatError, FormatResult};
use crate::layout::{INDEX_OFFSET, INDEX_SENTINEL, INDEX_SLOT_SIZE};
use crate::signature::Signature;
use binrw::io::{Read, Seek, SeekFrom, Write};
use binrw::{BinReaderExt, BinWriterExt};
use std::io::Cursor;

/// Ordered list of cartridge signatures
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyIndex {
    signatures: Vec<Signature>,
}

impl KeyIndex {
    /// Create an index from signatures, in the order given
    pub fn new(signatures: Vec<Signature>) -> Self {
        Self { signatures }
    }

    /// Read the index region
    ///
    /// Reads at most `max_slots` words and stops at the first sentinel. A
    /// region filled entirely with signatures is returned as-is.
    pub fn read<R: Read + Seek>(reader: &mut R, max_slots: usize) -> FormatResult<Self> {
        reader.seek(SeekFrom::Start(INDEX_OFFSET))?;

        let mut signatures = Vec::new();
        for slot in 0..max_slots {
            let word: u32 = reader.read_le().map_err(|e| match e {
                binrw::Error::Io(io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
                    FormatError::TruncatedIndex { slot }
                }
                other => FormatError::BinRead(other),
            })?;
            if word == INDEX_SENTINEL {
                return Ok(Self { signatures });
            }
            signatures.push(Signature::new(word));
        }

        Ok(Self { signatures })
    }

    /// Write the index region followed by one sentinel
    ///
    /// Nothing is written when the signatures and sentinel do not fit in
    /// `max_slots`, or when a signature equals the sentinel.
    pub fn write<W: Write + Seek>(&self, writer: &mut W, max_slots: usize) -> FormatResult<()> {
        let buffer = self.to_bytes(max_slots)?;
        writer.seek(SeekFrom::Start(INDEX_OFFSET))?;
        writer.write_all(&buffer)?;
        Ok(())
    }

    /// Serialize the signatures and sentinel
    pub fn to_bytes(&self, max_slots: usize) -> FormatResult<Vec<u8>> {
        if self.signatures.len() + 1 > max_slots {
            return Err(FormatError::CapacityExceeded {
                entries: self.signatures.len(),
                slots: max_slots,
            });
        }
        if self.signatures.iter().any(|s| s.is_reserved()) {
            return Err(FormatError::ReservedSignature);
        }

        let mut cursor = Cursor::new(Vec::with_capacity(
            (self.signatures.len() + 1) * INDEX_SLOT_SIZE,
        ));
        for signature in &self.signatures {
            cursor.write_le(signature)?;
        }
        cursor.write_le(&INDEX_SENTINEL)?;
        Ok(cursor.into_inner())
    }

    /// Get signatures in index order
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// Consume the index and return its signatures
    pub fn into_signatures(self) -> Vec<Signature> {
        self.signatures
    }

    /// Number of signatures (sentinel excluded)
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Check if the index holds no signatures
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Find the table position of a signature
    ///
    /// Uses binary search, so the index must be strictly ascending.
    pub fn position(&self, signature: Signature) -> Option<usize> {
        self.signatures.binary_search(&signature).ok()
    }

    /// Check the ordering invariant: strictly ascending, no duplicates
    pub fn is_strictly_ascending(&self) -> bool {
        self.signatures.windows(2).all(|w| w[0] < w[1])
    }
}

impl FromIterator<Signature> for KeyIndex {
    fn from_iter<I: IntoIterator<Item = Signature>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
