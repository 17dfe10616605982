//! Install request submitted by a caller.

use std::collections::BTreeMap;

use super::keys;

/// A request to install a template package.
///
/// The identifier is either a path to a local archive file or a feed
/// package name; which one it is gets decided by the
/// [`resolver`](super::resolve_installation_mode) before any acquisition
/// work. A request is immutable once submitted: the builder methods
/// consume `self` and the orchestrator takes ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    /// Local archive path or feed package name.
    pub identifier: String,

    /// Requested version. Must parse as a semantic version when present;
    /// ignored for local archives, which are self-describing.
    pub version: Option<String>,

    /// Free-form request details. Recognized keys live in [`keys`].
    pub details: BTreeMap<String, String>,
}

impl InstallRequest {
    /// Create a request for the given identifier.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            version: None,
            details: BTreeMap::new(),
        }
    }

    /// Request a specific version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Attach a request detail.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Candidate feed URIs from the [`keys::FEED_SOURCES`] detail.
    ///
    /// The value is split on [`keys::FEED_SOURCE_SEPARATOR`]; blank
    /// entries are dropped. An empty list tells the downloader to use its
    /// own default feeds.
    pub fn feed_sources(&self) -> Vec<String> {
        self.details
            .get(keys::FEED_SOURCES)
            .map(|value| {
                value
                    .split(keys::FEED_SOURCE_SEPARATOR)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
