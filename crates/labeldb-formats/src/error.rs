//! Error types for `labels.db` format operations

use thiserror::Error;

/// Format operation result type
pub type FormatResult<T> = Result<T, FormatError>;

/// Errors raised while reading or writing `labels.db` regions
#[derive(Debug, Error)]
pub enum FormatError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary read/write error
    #[error("Binary format error: {0}")]
    BinRead(#[from] binrw::Error),

    /// Key index ended before its sentinel
    #[error("Truncated key index: no data for slot {slot} and no sentinel seen")]
    TruncatedIndex {
        /// Slot that could not be read
        slot: usize,
    },

    /// Image table ended inside a block
    #[error("Truncated image table: block {block} expected {expected} bytes, got {actual}")]
    TruncatedBlock {
        /// Position of the block in the table
        block: usize,
        /// Bytes required for a full block
        expected: usize,
        /// Bytes actually available
        actual: usize,
    },

    /// Signatures plus sentinel do not fit in the index region
    #[error("Index capacity exceeded: {entries} signatures and a sentinel need more than {slots} slots")]
    CapacityExceeded {
        /// Number of signatures to be written
        entries: usize,
        /// Available slots, sentinel included
        slots: usize,
    },

    /// Signature string failed hex validation
    #[error("Invalid signature {input:?}: {reason}")]
    InvalidSignature {
        /// String as supplied by the caller
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// Signature collides with the index sentinel
    #[error("Signature FFFFFFFF is reserved as the index terminator")]
    ReservedSignature,

    /// Pixel block of the wrong size
    #[error("Invalid pixel block size: expected {expected} bytes, got {actual}")]
    InvalidBlockSize {
        /// Required block size
        expected: usize,
        /// Size supplied
        actual: usize,
    },
}

impl FormatError {
    /// Check if the input ended before a fixed-size read completed
    pub fn is_truncated(&self) -> bool {
        match self {
            Self::TruncatedIndex { .. } | Self::TruncatedBlock { .. } => true,
            Self::BinRead(e) => e.is_eof(),
            Self::Io(e) => e.kind() == std::io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }

    /// Check if this is a validation error (bad input rather than bad I/O)
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::CapacityExceeded { .. }
                | Self::InvalidSignature { .. }
                | Self::ReservedSignature
                | Self::InvalidBlockSize { .. }
        )
    }
}
