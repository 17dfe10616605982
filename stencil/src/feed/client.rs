//! HTTP client for flat package feeds.

use std::path::Path;
use std::time::Duration;

use reqwest::{Client, Url};
use semver::Version;
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::installer::{
    FeedDownloader, InstallerError, InstallerResult, LatestVersion, PackageInfo, UpdateFeed,
};
use crate::package::{staged_file_name, DEFAULT_ARCHIVE_EXT};

use super::index::{FeedIndex, INDEX_FILE};

/// Default HTTP request timeout (30 seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP implementation of [`FeedDownloader`] and [`UpdateFeed`].
///
/// A feed is a base URI hosting an [`INDEX_FILE`] document plus archives
/// named `<identifier>.<version>.tpkg`. Downloads stage through a
/// `.part` temp file and rename into place, so a cancelled or failed
/// transfer never leaves a half-written destination.
///
/// # Example
///
/// ```ignore
/// use stencil::feed::HttpFeedClient;
///
/// let client = HttpFeedClient::new()
///     .with_default_feeds(vec!["https://templates.example.com/feed".to_string()]);
/// ```
#[derive(Clone)]
pub struct HttpFeedClient {
    client: Client,
    timeout: Duration,
    default_feeds: Vec<String>,
}

impl std::fmt::Debug for HttpFeedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFeedClient")
            .field("timeout", &self.timeout)
            .field("default_feeds", &self.default_feeds)
            .finish()
    }
}

impl Default for HttpFeedClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFeedClient {
    /// Create a client with default settings and no default feeds.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stencil/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to create HTTP client");

        Self {
            client,
            timeout,
            default_feeds: Vec::new(),
        }
    }

    /// Feeds consulted when a request names none.
    pub fn with_default_feeds(mut self, feeds: Vec<String>) -> Self {
        self.default_feeds = feeds;
        self
    }

    /// Fetch and parse a feed's index document.
    async fn fetch_index(&self, feed: &str, cancel: &CancellationToken) -> InstallerResult<FeedIndex> {
        let url = join_feed_url(feed, INDEX_FILE)?;

        let response = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(InstallerError::Generic("operation cancelled".to_string()));
            }
            result = self.client.get(url).send() => result.map_err(|e| {
                warn!(feed, error = %e, "feed index request failed");
                InstallerError::InvalidSource {
                    reason: format!("cannot reach feed {}: {}", feed, e),
                }
            })?,
        };

        if !response.status().is_success() {
            return Err(InstallerError::InvalidSource {
                reason: format!("feed {} answered HTTP {}", feed, response.status()),
            });
        }

        response.json::<FeedIndex>().await.map_err(|e| {
            warn!(feed, error = %e, "feed index is malformed");
            InstallerError::InvalidSource {
                reason: format!("malformed index on feed {}: {}", feed, e),
            }
        })
    }

    /// Download an archive to `dest` via a temp file.
    async fn download_archive(
        &self,
        url: Url,
        dest: &Path,
        cancel: &CancellationToken,
    ) -> InstallerResult<()> {
        let response = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(InstallerError::Generic("operation cancelled".to_string()));
            }
            result = self.client.get(url.clone()).send() => result.map_err(|e| {
                warn!(%url, error = %e, "archive request failed");
                InstallerError::download_failed(format!("request to {} failed: {}", url, e))
            })?,
        };

        if !response.status().is_success() {
            return Err(InstallerError::download_failed(format!(
                "{} answered HTTP {}",
                url,
                response.status()
            )));
        }

        let bytes = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(InstallerError::Generic("operation cancelled".to_string()));
            }
            result = response.bytes() => result.map_err(|e| {
                InstallerError::download_failed(format!("reading body from {} failed: {}", url, e))
            })?,
        };

        let file_name = dest
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| InstallerError::download_failed("destination has no file name"))?;
        let temp = dest.with_file_name(format!("{}.part", file_name));

        if let Err(e) = fs::write(&temp, &bytes).await {
            let _ = fs::remove_file(&temp).await;
            return Err(InstallerError::download_failed(format!(
                "writing {} failed: {}",
                temp.display(),
                e
            )));
        }

        if cancel.is_cancelled() {
            let _ = fs::remove_file(&temp).await;
            return Err(InstallerError::Generic("operation cancelled".to_string()));
        }

        if let Err(e) = fs::rename(&temp, dest).await {
            let _ = fs::remove_file(&temp).await;
            return Err(InstallerError::download_failed(format!(
                "moving archive into place failed: {}",
                e
            )));
        }

        debug!(dest = %dest.display(), bytes = bytes.len(), "staged feed archive");
        Ok(())
    }
}

impl FeedDownloader for HttpFeedClient {
    async fn download(
        &self,
        install_root: &Path,
        identifier: &str,
        version: Option<&Version>,
        feeds: &[String],
        cancel: &CancellationToken,
    ) -> InstallerResult<PackageInfo> {
        let feeds = if feeds.is_empty() {
            self.default_feeds.as_slice()
        } else {
            feeds
        };

        if feeds.is_empty() {
            return Err(InstallerError::InvalidSource {
                reason: "no feed sources configured".to_string(),
            });
        }

        let mut last_error: Option<InstallerError> = None;

        for feed in feeds {
            let index = match self.fetch_index(feed, cancel).await {
                Ok(index) => index,
                Err(e) => {
                    warn!(feed, error = %e, "skipping feed");
                    last_error = Some(e);
                    continue;
                }
            };

            let Some(entry) = index.find(identifier) else {
                debug!(feed, identifier, "package not listed on feed");
                continue;
            };

            let chosen = match version {
                Some(requested) => {
                    if !entry.has_version(requested) {
                        debug!(feed, identifier, version = %requested, "version not on feed");
                        continue;
                    }
                    requested.clone()
                }
                None => match entry.latest() {
                    Some(latest) => latest.clone(),
                    None => continue,
                },
            };

            let file_name = staged_file_name(&entry.identifier, &chosen, DEFAULT_ARCHIVE_EXT);
            let url = join_feed_url(feed, &file_name)?;
            let dest = install_root.join(&file_name);

            match self.download_archive(url, &dest, cancel).await {
                Ok(()) => {
                    return Ok(PackageInfo {
                        full_path: dest,
                        author: entry.author.clone(),
                        package_identifier: entry.identifier.clone(),
                        package_version: chosen,
                        feed_uri: Some(feed.clone()),
                    });
                }
                Err(e) => {
                    warn!(feed, identifier, error = %e, "download from feed failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| InstallerError::PackageNotFound {
            identifier: identifier.to_string(),
        }))
    }
}

impl UpdateFeed for HttpFeedClient {
    async fn latest(
        &self,
        identifier: &str,
        current: &Version,
        feed_hint: Option<&str>,
        cancel: &CancellationToken,
    ) -> InstallerResult<LatestVersion> {
        let feeds: Vec<String> = match feed_hint {
            Some(hint) if !hint.is_empty() => vec![hint.to_string()],
            _ => self.default_feeds.clone(),
        };

        if feeds.is_empty() {
            return Err(InstallerError::InvalidSource {
                reason: "no feed sources configured".to_string(),
            });
        }

        let mut last_error: Option<InstallerError> = None;

        for feed in &feeds {
            match self.fetch_index(feed, cancel).await {
                Ok(index) => {
                    if let Some(latest) = index.find(identifier).and_then(|e| e.latest()) {
                        return Ok(LatestVersion {
                            latest: latest.clone(),
                            is_latest: current >= latest,
                        });
                    }
                    debug!(feed, identifier, "package not listed on feed");
                }
                Err(e) => {
                    warn!(feed, error = %e, "skipping feed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| InstallerError::PackageNotFound {
            identifier: identifier.to_string(),
        }))
    }
}

/// Join a file name onto a feed base URI.
fn join_feed_url(feed: &str, name: &str) -> InstallerResult<Url> {
    let mut base = Url::parse(feed).map_err(|e| InstallerError::InvalidSource {
        reason: format!("malformed feed URI '{}': {}", feed, e),
    })?;

    // A trailing slash makes join() append instead of replacing the last
    // path segment.
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(name).map_err(|e| InstallerError::InvalidSource {
        reason: format!("cannot address '{}' on feed '{}': {}", name, feed, e),
    })
}
