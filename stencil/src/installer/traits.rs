//! Trait boundaries for external collaborators.
//!
//! The installer consumes three capabilities it does not implement
//! itself: reading archive metadata, downloading packages from feeds, and
//! looking up latest versions. Each is a trait so tests can substitute
//! mocks and hosts can plug in their own transports.

use std::future::Future;
use std::path::{Path, PathBuf};

use semver::Version;
use tokio_util::sync::CancellationToken;

use crate::package::ArchiveMetadata;

use super::InstallerResult;

/// Reads identifying metadata from a package archive on disk.
pub trait ArchiveReader: Send + Sync {
    /// Extract identifier, version and author from the archive at `path`.
    ///
    /// # Errors
    ///
    /// [`InstallerError::InvalidPackage`](super::InstallerError::InvalidPackage)
    /// when the archive is unreadable or its metadata is malformed.
    fn read_metadata(&self, path: &Path) -> InstallerResult<ArchiveMetadata>;
}

/// Result of a completed package acquisition.
///
/// `full_path` is set only after the bytes are durably staged on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    /// Staged archive location.
    pub full_path: PathBuf,
    /// Package author, when known.
    pub author: Option<String>,
    /// Canonical package identifier.
    pub package_identifier: String,
    /// Acquired package version.
    pub package_version: Version,
    /// Feed the package came from; `None` for local installs.
    pub feed_uri: Option<String>,
}

/// Downloads and stages a package from a remote feed.
pub trait FeedDownloader: Send + Sync {
    /// Fetch `identifier` (at `version`, or the latest available) from
    /// the first of `feeds` that can supply it, staging the archive
    /// under `install_root`.
    ///
    /// An empty `feeds` slice lets the downloader fall back to its own
    /// configured defaults.
    ///
    /// # Errors
    ///
    /// One of `DownloadFailed`, `PackageNotFound`, `InvalidSource`.
    fn download(
        &self,
        install_root: &Path,
        identifier: &str,
        version: Option<&Version>,
        feeds: &[String],
        cancel: &CancellationToken,
    ) -> impl Future<Output = InstallerResult<PackageInfo>> + Send;
}

/// Latest-version answer from an update feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestVersion {
    /// Newest version the feed offers.
    pub latest: Version,
    /// True when the caller's current version is already the newest.
    pub is_latest: bool,
}

/// Looks up the latest published version of a package.
pub trait UpdateFeed: Send + Sync {
    /// Query the feed named by `feed_hint` (or the implementation's
    /// defaults) for the newest version of `identifier`.
    ///
    /// # Errors
    ///
    /// One of `PackageNotFound`, `InvalidSource`, or a transport failure
    /// mapped to `GenericError`.
    fn latest(
        &self,
        identifier: &str,
        current: &Version,
        feed_hint: Option<&str>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = InstallerResult<LatestVersion>> + Send;
}
