//! Merge custom cartridge label images into an Analogue 3D `labels.db`.
//!
//! The database holds a sorted index of cartridge signatures and, in the same
//! order, one fixed-size BGRA pixel block per signature (see
//! [`labeldb_formats`]). This crate adds the pieces needed to update it:
//!
//! - [`PixelEncoder`]: decodes an image file and turns it into a pixel block
//! - [`merge`]: sorted merge of existing entries with pending images, encoding
//!   only the images that end up in the output
//! - [`LabelDatabase`]: read-merge-write cycle over the file
//! - [`commands`]: the operations behind the `labeldb` binary
//!
//! # Example
//!
//! ```rust,no_run
//! use labeldb::{LabelDatabase, PendingSet, PixelEncoder};
//!
//! # fn example() -> labeldb::Result<()> {
//! let pending = PendingSet::from_paths(["covers/3274BDAF.png", "covers/0x0001abcd.jpg"])?;
//! let mut db = LabelDatabase::open("labels.db")?;
//! let stats = db.merge(&pending, &mut PixelEncoder::new())?;
//! println!("{} inserted, {} replaced", stats.inserted, stats.replaced);
//! # Ok(())
//! # }
//! ```
//!
//! Writes happen in place with no journal: the index is written first and
//! the image table second, so a failure between the two leaves the file
//! inconsistent. Keep a copy (see [`MergeOptions::with_backup`]) if that
//! matters.

#![warn(missing_docs)]

use labeldb_formats::{FormatError, Signature};
use std::path::PathBuf;
use thiserror::Error;

pub mod commands;
pub mod config;
mod database;
mod encoder;
mod merge;
mod pending;

pub use config::{Cli, Command, MergeOptions};
pub use database::LabelDatabase;
pub use encoder::{LABEL_FILTER, PixelEncoder};
pub use merge::{BlockResolver, Entry, MergeStats, Merged, merge};
pub use pending::{PendingImage, PendingSet};

/// Result type for label database operations.
pub type Result<T> = std::result::Result<T, LabelError>;

/// Errors that can occur while updating a label database.
#[derive(Debug, Error)]
pub enum LabelError {
    /// I/O error without a known path.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error on a specific file.
    #[error("I/O error on {}: {source}", path.display())]
    File {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Source image could not be decoded.
    #[error("Failed to decode image {}: {source}", path.display())]
    Decode {
        /// Image file
        path: PathBuf,
        /// Decoder error
        #[source]
        source: image::ImageError,
    },

    /// Image could not be written.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Database region could not be read or written.
    #[error("Database format error: {0}")]
    Format(#[from] FormatError),

    /// Two pending images carry the same signature.
    #[error("Duplicate signature {0} in pending images")]
    DuplicateSignature(Signature),

    /// Requested signature is not in the database.
    #[error("Signature {0} not found in database")]
    NotFound(Signature),

    /// Invalid options.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LabelError {
    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    /// Check if the input was rejected before any I/O-level failure
    pub fn is_format_error(&self) -> bool {
        match self {
            Self::Format(e) => e.is_validation_error(),
            Self::DuplicateSignature(_) | Self::Config(_) => true,
            _ => false,
        }
    }

    /// Check if the database ended before a fixed-size read completed
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Format(e) if e.is_truncated())
    }
}
