//! Read-merge-write cycle over a `labels.db` file
//!
//! Every update reads the whole index and table, merges in memory, and writes
//! both regions back wholesale: the index first, then the table. Nothing is
//! journaled, so an error during the table write leaves a new index pointing
//! at partly old data.

use crate::merge::{BlockResolver, Entry, MergeStats, Merged, merge};
use crate::pending::PendingSet;
use crate::{LabelError, Result};
use labeldb_formats::layout::MAX_INDEX_SLOTS;
use labeldb_formats::{
    FormatError, ImageTable, KeyIndex, LabelsHeader, PixelBlock, Signature, write_blocks,
    write_empty_database,
};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// A label database over any seekable storage
#[derive(Debug)]
pub struct LabelDatabase<S> {
    storage: S,
    max_slots: usize,
}

impl LabelDatabase<File> {
    /// Open an existing database file for reading and writing
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| LabelError::file(path, e))?;
        Ok(Self::new(file))
    }

    /// Open an existing database file read-only
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| LabelError::file(path, e))?;
        Ok(Self::new(file))
    }

    /// Create a new database file with no entries
    ///
    /// Fails if the file exists, unless `overwrite` is set.
    pub fn create(path: impl AsRef<Path>, overwrite: bool) -> Result<Self> {
        let path = path.as_ref();
        let mut options = OpenOptions::new();
        options.read(true).write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        let file = options.open(path).map_err(|e| LabelError::file(path, e))?;

        let mut db = Self::new(file);
        db.initialize()?;
        info!("Created empty label database {}", path.display());
        Ok(db)
    }
}

impl<S: Read + Write + Seek> LabelDatabase<S> {
    /// Wrap storage holding a database
    pub const fn new(storage: S) -> Self {
        Self {
            storage,
            max_slots: MAX_INDEX_SLOTS,
        }
    }

    /// Limit the number of index slots (sentinel included)
    #[must_use]
    pub const fn with_max_slots(mut self, max_slots: usize) -> Self {
        self.max_slots = max_slots;
        self
    }

    /// Write a header and an empty index
    pub fn initialize(&mut self) -> Result<()> {
        write_empty_database(&mut self.storage)?;
        self.storage.flush()?;
        Ok(())
    }

    /// Read the file header
    pub fn header(&mut self) -> Result<LabelsHeader> {
        Ok(LabelsHeader::parse(&mut self.storage)?)
    }

    /// Read the key index
    pub fn signatures(&mut self) -> Result<KeyIndex> {
        let index = KeyIndex::read(&mut self.storage, self.max_slots)?;
        if !index.is_strictly_ascending() {
            warn!("Key index is not strictly ascending; lookups and merges may misbehave");
        }
        Ok(index)
    }

    /// Read every entry, pairing the Nth signature with the Nth block
    pub fn load(&mut self) -> Result<Vec<Entry>> {
        let index = self.signatures()?;
        let table = ImageTable::read(&mut self.storage, index.len())?;
        debug!("Loaded {} entries", index.len());

        Ok(index
            .into_signatures()
            .into_iter()
            .zip(table.into_blocks())
            .map(|(signature, block)| Entry::new(signature, block))
            .collect())
    }

    /// Read the block stored for one signature
    pub fn block(&mut self, signature: Signature) -> Result<PixelBlock> {
        let index = self.signatures()?;
        let position = index
            .position(signature)
            .ok_or(LabelError::NotFound(signature))?;
        Ok(ImageTable::read_block(&mut self.storage, position)?)
    }

    /// Merge pending images into the loaded entries without writing anything
    ///
    /// Fails before resolving any image if the result could not fit in the
    /// index.
    pub fn plan<Src, R>(
        &mut self,
        pending: &PendingSet<Src>,
        resolver: &mut R,
    ) -> Result<Merged>
    where
        R: BlockResolver<Src, Error = LabelError> + ?Sized,
    {
        let existing = self.load()?;

        let added = pending
            .signatures()
            .filter(|sig| existing.binary_search_by_key(sig, |e| e.signature).is_err())
            .count();
        let total = existing.len() + added;
        if total + 1 > self.max_slots {
            return Err(FormatError::CapacityExceeded {
                entries: total,
                slots: self.max_slots,
            }
            .into());
        }

        merge(existing, pending, resolver)
    }

    /// Write entries back: index first, then image table
    ///
    /// The index is validated in full before the first byte is written.
    pub fn store(&mut self, entries: &[Entry]) -> Result<()> {
        let index: KeyIndex = entries.iter().map(|e| e.signature).collect();

        debug!("Writing index and {} blocks", entries.len());
        index.write(&mut self.storage, self.max_slots)?;
        write_blocks(&mut self.storage, entries.iter().map(|e| &e.block))?;
        self.storage.flush()?;
        Ok(())
    }

    /// Merge pending images into the database and rewrite it
    pub fn merge<Src, R>(
        &mut self,
        pending: &PendingSet<Src>,
        resolver: &mut R,
    ) -> Result<MergeStats>
    where
        R: BlockResolver<Src, Error = LabelError> + ?Sized,
    {
        let merged = self.plan(pending, resolver)?;
        self.store(&merged.entries)?;
        Ok(merged.stats)
    }

    /// Get the underlying storage back
    pub fn into_inner(self) -> S {
        self.storage
    }
}
