//! File-name based archive reader.

use std::path::Path;

use tracing::trace;

use crate::package::{parse_archive_file_name, ArchiveMetadata};

use super::traits::ArchiveReader;
use super::{InstallerError, InstallerResult};

/// Archive reader that derives metadata from the archive file name.
///
/// Staged archives follow the `<identifier>.<version>.<ext>` convention,
/// so the name alone identifies the package. This reader never opens the
/// file; it cannot recover an author, so [`ArchiveMetadata::author`] is
/// always `None`. Hosts with a real format reader substitute their own
/// [`ArchiveReader`] implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileNameReader;

impl FileNameReader {
    /// Create a new file-name reader.
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveReader for FileNameReader {
    fn read_metadata(&self, path: &Path) -> InstallerResult<ArchiveMetadata> {
        if !path.is_file() {
            return Err(InstallerError::InvalidPackage {
                reason: format!("no archive file at {}", path.display()),
            });
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| InstallerError::InvalidPackage {
                reason: format!("archive name is not valid UTF-8: {}", path.display()),
            })?;

        let (identifier, version) =
            parse_archive_file_name(file_name).ok_or_else(|| InstallerError::InvalidPackage {
                reason: format!("archive name '{}' does not carry identifier and version", file_name),
            })?;

        trace!(identifier, %version, "parsed archive metadata from file name");

        Ok(ArchiveMetadata::new(identifier, version))
    }
}
