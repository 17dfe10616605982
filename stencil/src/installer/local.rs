//! Install root staging for local archive files.

use std::fs;
use std::path::{Path, PathBuf};

use semver::Version;
use tracing::{debug, error};

use crate::package::{staged_file_name, ArchiveMetadata, DEFAULT_ARCHIVE_EXT};

use super::{InstallerError, InstallerResult};

/// The directory packages are staged into.
///
/// The install root is the one shared mutable resource of the installer.
/// The existence check and the copy in [`stage_local_archive`] are not
/// atomic; two concurrent installs of the same identifier and version can
/// race. That window is a known gap, kept as-is.
///
/// [`stage_local_archive`]: InstallRoot::stage_local_archive
#[derive(Debug, Clone)]
pub struct InstallRoot {
    root: PathBuf,
}

impl InstallRoot {
    /// Create an install root at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if it does not exist yet.
    pub fn ensure_exists(&self) -> InstallerResult<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            error!(root = %self.root.display(), error = %e, "failed to create install root");
            InstallerError::Generic(format!(
                "cannot create install root {}: {}",
                self.root.display(),
                e
            ))
        })
    }

    /// Destination path for a staged archive.
    pub fn destination_for(&self, identifier: &str, version: &Version, extension: &str) -> PathBuf {
        self.root.join(staged_file_name(identifier, version, extension))
    }

    /// Copy a local archive into the install root without overwriting.
    ///
    /// The destination name is computed from the archive metadata,
    /// keeping the source file's extension. An existing file at the
    /// destination is a collision and fails the install; the file already
    /// there is left untouched.
    ///
    /// # Errors
    ///
    /// [`InstallerError::DownloadFailed`] for both the collision case and
    /// a failing copy.
    pub fn stage_local_archive(
        &self,
        source: &Path,
        metadata: &ArchiveMetadata,
    ) -> InstallerResult<PathBuf> {
        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(DEFAULT_ARCHIVE_EXT);
        let destination = self.destination_for(&metadata.identifier, &metadata.version, extension);

        if destination.exists() {
            debug!(
                destination = %destination.display(),
                "staging collision: destination already exists"
            );
            return Err(InstallerError::DownloadFailed {
                reason: format!("destination already exists: {}", destination.display()),
            });
        }

        self.ensure_exists()?;

        if let Err(e) = fs::copy(source, &destination) {
            error!(
                source = %source.display(),
                destination = %destination.display(),
                error = %e,
                "copying local archive failed"
            );
            return Err(InstallerError::DownloadFailed {
                reason: format!("copy to {} failed: {}", destination.display(), e),
            });
        }

        debug!(destination = %destination.display(), "staged local archive");
        Ok(destination)
    }

    /// Delete a staged archive file.
    ///
    /// Deletion is attempted once; failures are not retried.
    pub fn remove_staged(&self, staged_path: &Path) -> InstallerResult<()> {
        fs::remove_file(staged_path).map_err(|e| {
            error!(
                path = %staged_path.display(),
                error = %e,
                "failed to delete staged archive"
            );
            InstallerError::Generic(format!(
                "cannot delete {}: {}",
                staged_path.display(),
                e
            ))
        })
    }
}
