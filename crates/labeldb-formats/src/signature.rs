//! Cartridge signatures (the keys of the label index)

use crate::error::{FormatError, FormatResult};
use crate::layout::INDEX_SENTINEL;
use binrw::{BinRead, BinWrite};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// 32-bit cartridge signature
///
/// Stored little-endian in the key index. The signature of a cartridge is the
/// CRC32 of the first 8 KiB of its big-endian ROM image, and label image files
/// are named after it in hex.
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[brw(little)]
pub struct Signature(u32);

impl Signature {
    /// Create a signature from its numeric value
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Check if this value is the index terminator and cannot be stored
    pub const fn is_reserved(self) -> bool {
        self.0 == INDEX_SENTINEL
    }

    /// Parse a signature from a hex string
    ///
    /// Surrounding whitespace is ignored and an empty string is signature 0.
    /// Otherwise the string may carry a `0x` prefix (any case) and must hold
    /// one to eight hex digits; shorter strings are zero-extended on the left.
    pub fn from_hex(input: &str) -> FormatResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Self(0));
        }

        let lower = trimmed.to_lowercase();
        let digits = lower.strip_prefix("0x").unwrap_or(&lower);
        if digits.is_empty() {
            return Err(invalid(input, "no hex digits after 0x prefix"));
        }
        if digits.len() > 8 {
            return Err(invalid(input, "more than 8 hex digits"));
        }

        let padded = format!("{digits:0>8}");
        let mut bytes = [0u8; 4];
        hex::decode_to_slice(&padded, &mut bytes).map_err(|e| invalid(input, &e.to_string()))?;
        Ok(Self(u32::from_be_bytes(bytes)))
    }

    /// Parse the signature an image file is named after
    ///
    /// The final extension of the base name is dropped, so `dir/3274BDAF.png`
    /// yields `0x3274BDAF` and a bare `.png` yields signature 0.
    pub fn from_file_name(path: &Path) -> FormatResult<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        let stem = name.rfind('.').map_or(&*name, |dot| &name[..dot]);
        Self::from_hex(stem)
    }
}

fn invalid(input: &str, reason: &str) -> FormatError {
    FormatError::InvalidSignature {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

impl From<u32> for Signature {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl FromStr for Signature {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}
