//! Installer configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default directory name for staged packages.
const DEFAULT_INSTALL_ROOT: &str = "packages";

/// Default timeout for feed requests (30 seconds).
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Configuration for a [`PackageInstaller`](crate::installer::PackageInstaller)
/// and its feed client.
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    /// Directory packages are staged into.
    pub install_root: PathBuf,

    /// Feeds consulted when a request names none.
    pub default_feeds: Vec<String>,

    /// Timeout for individual feed requests.
    pub http_timeout: Duration,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            install_root: PathBuf::from(DEFAULT_INSTALL_ROOT),
            default_feeds: Vec::new(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl InstallerConfig {
    /// Configuration with the given install root and defaults otherwise.
    pub fn new(install_root: impl Into<PathBuf>) -> Self {
        Self {
            install_root: install_root.into(),
            ..Self::default()
        }
    }

    /// Set the install root.
    pub fn with_install_root(mut self, install_root: impl Into<PathBuf>) -> Self {
        self.install_root = install_root.into();
        self
    }

    /// Append a default feed.
    pub fn with_default_feed(mut self, feed: impl Into<String>) -> Self {
        self.default_feeds.push(feed.into());
        self
    }

    /// Set the feed request timeout.
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }
}
