//! Sorted merge of database entries with pending images
//!
//! Both inputs are ascending by signature. Existing entries are moved to the
//! output untouched; a pending image is resolved to a block only when it is
//! emitted, and replaces any existing entry with the same signature.

use crate::pending::PendingSet;
use labeldb_formats::{PixelBlock, Signature};
use std::cmp::Ordering;
use tracing::debug;

/// A signature and its pixel block, as stored at one position of the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Cartridge signature
    pub signature: Signature,
    /// Encoded label
    pub block: PixelBlock,
}

impl Entry {
    /// Create an entry
    pub const fn new(signature: Signature, block: PixelBlock) -> Self {
        Self { signature, block }
    }
}

/// Turns the source of a pending image into a pixel block
///
/// Implemented for [`PixelEncoder`](crate::PixelEncoder) over image paths and
/// for any `FnMut(Signature, &S) -> Result<PixelBlock, E>` closure.
pub trait BlockResolver<S> {
    /// Error returned when a source cannot be resolved
    type Error;

    /// Produce the block for `signature` from `source`
    fn resolve(&mut self, signature: Signature, source: &S) -> Result<PixelBlock, Self::Error>;
}

impl<S, E, F> BlockResolver<S> for F
where
    F: FnMut(Signature, &S) -> Result<PixelBlock, E>,
{
    type Error = E;

    fn resolve(&mut self, signature: Signature, source: &S) -> Result<PixelBlock, E> {
        self(signature, source)
    }
}

/// Counts of what a merge did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Existing entries carried over unchanged
    pub kept: usize,
    /// Existing entries whose block was replaced
    pub replaced: usize,
    /// New signatures added
    pub inserted: usize,
}

impl MergeStats {
    /// Number of entries in the merged output
    pub const fn total(&self) -> usize {
        self.kept + self.replaced + self.inserted
    }

    /// Number of blocks that were resolved
    pub const fn resolved(&self) -> usize {
        self.replaced + self.inserted
    }
}

/// Result of a merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
    /// Entries in ascending signature order
    pub entries: Vec<Entry>,
    /// What happened to get there
    pub stats: MergeStats,
}

/// Merge `incoming` into `existing`
///
/// `existing` must be ascending by signature; `incoming` always is. The
/// resolver runs once per pending image, in ascending signature order, and
/// its first error aborts the merge.
pub fn merge<S, R>(
    existing: Vec<Entry>,
    incoming: &PendingSet<S>,
    resolver: &mut R,
) -> Result<Merged, R::Error>
where
    R: BlockResolver<S> + ?Sized,
{
    let mut entries = Vec::with_capacity(existing.len() + incoming.len());
    let mut stats = MergeStats::default();

    let mut old = existing.into_iter().peekable();
    let mut new = incoming.iter().peekable();

    loop {
        let (Some(current), Some(&pending)) = (old.peek(), new.peek()) else {
            break;
        };

        let order = current.signature.cmp(&pending.signature);
        match order {
            Ordering::Less => {
                entries.extend(old.next());
                stats.kept += 1;
            }
            Ordering::Greater => {
                let block = resolver.resolve(pending.signature, &pending.source)?;
                entries.push(Entry::new(pending.signature, block));
                stats.inserted += 1;
                new.next();
            }
            Ordering::Equal => {
                debug!("Replacing label {}", pending.signature);
                let block = resolver.resolve(pending.signature, &pending.source)?;
                entries.push(Entry::new(pending.signature, block));
                stats.replaced += 1;
                old.next();
                new.next();
            }
        }
    }

    // At most one of these still has items
    for entry in old {
        entries.push(entry);
        stats.kept += 1;
    }
    for pending in new {
        let block = resolver.resolve(pending.signature, &pending.source)?;
        entries.push(Entry::new(pending.signature, block));
        stats.inserted += 1;
    }

    debug!(
        "Merged {} kept + {} replaced + {} inserted -> {} entries",
        stats.kept,
        stats.replaced,
        stats.inserted,
        entries.len()
    );

    Ok(Merged { entries, stats })
}
