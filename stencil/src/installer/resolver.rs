//! Source resolution: local archive file vs. remote feed package.

use std::path::{Path, PathBuf};

/// How an install request will be satisfied.
///
/// Classification happens before any acquisition work because the two
/// paths have different staging rules and different failure kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallationMode {
    /// The identifier names an archive file on the local file system.
    LocalArchive(PathBuf),
    /// The identifier names a package to fetch from a feed.
    RemoteFeed,
}

/// Classify an identifier by inspecting the file system.
///
/// An identifier is local iff a regular file exists at that path. No
/// network access and no archive reading happens here; metadata
/// extraction is only attempted later, on a path known to exist.
pub fn resolve_installation_mode(identifier: &str) -> InstallationMode {
    let path = Path::new(identifier);
    if path.is_file() {
        InstallationMode::LocalArchive(path.to_path_buf())
    } else {
        InstallationMode::RemoteFeed
    }
}
