//! Core types for template archive packages.

use semver::Version;

/// Metadata identifying a template archive package.
///
/// Produced by an [`ArchiveReader`](crate::installer::ArchiveReader) from a
/// package file on disk. The archive is self-describing: identifier and
/// version always come from the archive itself, never from the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMetadata {
    /// Package identifier (e.g., "acme.webapi.templates").
    pub identifier: String,

    /// Package version.
    pub version: Version,

    /// Package author, when the archive carries one.
    pub author: Option<String>,
}

impl ArchiveMetadata {
    /// Create metadata for an archive without author information.
    pub fn new(identifier: impl Into<String>, version: Version) -> Self {
        Self {
            identifier: identifier.into(),
            version,
            author: None,
        }
    }

    /// Attach an author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_new() {
        let meta = ArchiveMetadata::new("acme.webapi", Version::new(1, 2, 3));
        assert_eq!(meta.identifier, "acme.webapi");
        assert_eq!(meta.version, Version::new(1, 2, 3));
        assert_eq!(meta.author, None);
    }

    #[test]
    fn test_metadata_with_author() {
        let meta = ArchiveMetadata::new("acme.webapi", Version::new(1, 0, 0)).with_author("Acme");
        assert_eq!(meta.author.as_deref(), Some("Acme"));
    }
}
