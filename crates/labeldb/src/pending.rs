//! Images waiting to be merged into the database

use crate::{LabelError, Result};
use labeldb_formats::{FormatError, Signature};
use std::path::{Path, PathBuf};

/// A signature paired with the source its block will be encoded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImage<S = PathBuf> {
    /// Signature the block will be stored under
    pub signature: Signature,
    /// Where the block comes from (normally an image file)
    pub source: S,
}

impl<S> PendingImage<S> {
    /// Create a pending image
    pub const fn new(signature: Signature, source: S) -> Self {
        Self { signature, source }
    }
}

impl PendingImage<PathBuf> {
    /// Create a pending image from a file named after its signature
    ///
    /// The path is made absolute; the file itself is not opened.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let signature = Signature::from_file_name(path)?;
        let source = std::path::absolute(path).map_err(|e| LabelError::file(path, e))?;
        Ok(Self { signature, source })
    }
}

/// Pending images sorted by signature, each signature at most once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSet<S = PathBuf> {
    images: Vec<PendingImage<S>>,
}

impl<S> PendingSet<S> {
    /// Sort images by signature and reject duplicates
    ///
    /// Signatures that collide with the index terminator are rejected too,
    /// so bad input fails before the database is touched.
    pub fn new(mut images: Vec<PendingImage<S>>) -> Result<Self> {
        images.sort_by_key(|image| image.signature);

        if let Some(pair) = images.windows(2).find(|w| w[0].signature == w[1].signature) {
            return Err(LabelError::DuplicateSignature(pair[0].signature));
        }
        if images.iter().any(|image| image.signature.is_reserved()) {
            return Err(FormatError::ReservedSignature.into());
        }

        Ok(Self { images })
    }

    /// Create an empty set
    pub fn empty() -> Self {
        Self { images: Vec::new() }
    }

    /// Iterate in ascending signature order
    pub fn iter(&self) -> std::slice::Iter<'_, PendingImage<S>> {
        self.images.iter()
    }

    /// Number of pending images
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Check if nothing is pending
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Signatures in ascending order
    pub fn signatures(&self) -> impl Iterator<Item = Signature> + '_ {
        self.images.iter().map(|image| image.signature)
    }
}

impl PendingSet<PathBuf> {
    /// Build a set from image paths, taking each signature from the file name
    pub fn from_paths<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let images = paths
            .into_iter()
            .map(PendingImage::from_path)
            .collect::<Result<Vec<_>>>()?;
        Self::new(images)
    }
}

impl<'a, S> IntoIterator for &'a PendingSet<S> {
    type Item = &'a PendingImage<S>;
    type IntoIter = std::slice::Iter<'a, PendingImage<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.iter()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn image(sig: u32, source: &'static str) -> PendingImage<&'static str> {
        PendingImage::new(Signature::new(sig), source)
    }

    #[test]
    fn test_new_sorts_by_signature() {
        let set = PendingSet::new(vec![image(30, "c"), image(10, "a"), image(20, "b")]).unwrap();
        let order: Vec<_> = set.iter().map(|p| p.source).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let err = PendingSet::new(vec![image(5, "a"), image(9, "b"), image(5, "c")]).unwrap_err();
        assert!(matches!(err, LabelError::DuplicateSignature(sig) if sig.get() == 5));
        assert!(err.is_format_error());
    }

    #[test]
    fn test_new_rejects_reserved_signature() {
        let err = PendingSet::new(vec![image(u32::MAX, "a")]).unwrap_err();
        assert!(matches!(err, LabelError::Format(FormatError::ReservedSignature)));
    }

    #[test]
    fn test_from_paths_uses_file_names() {
        let set = PendingSet::from_paths(["art/3274BDAF.png", "0x0000abcd.jpg", "ab.bmp"]).unwrap();
        let sigs: Vec<u32> = set.signatures().map(Signature::get).collect();
        assert_eq!(sigs, vec![0xAB, 0xABCD, 0x3274_BDAF]);
        assert!(set.iter().all(|p| p.source.is_absolute()));
        assert!(set.iter().any(|p| p.source.ends_with("art/3274BDAF.png")));
    }

    #[test]
    fn test_from_paths_rejects_bad_names() {
        let err = PendingSet::from_paths(["front-cover.png"]).unwrap_err();
        assert!(matches!(
            err,
            LabelError::Format(FormatError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn test_from_paths_rejects_same_signature_spelled_twice() {
        let err = PendingSet::from_paths(["a/00000001.png", "b/0x1.jpg"]).unwrap_err();
        assert!(matches!(err, LabelError::DuplicateSignature(sig) if sig.get() == 1));
    }
}
