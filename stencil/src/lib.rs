//! Stencil - template package lifecycle management
//!
//! This library manages externally-sourced template packages distributed
//! as versioned archives: validating install requests, acquiring package
//! bytes from local files or remote feeds, staging them under an install
//! root, and recording installed sources so they can be reconstructed,
//! updated and removed later.
//!
//! # High-Level API
//!
//! ```ignore
//! use stencil::config::InstallerConfig;
//! use stencil::feed::HttpFeedClient;
//! use stencil::installer::{FileNameReader, InstallRequest, PackageInstaller};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = InstallerConfig::new("/opt/templates")
//!     .with_default_feed("https://templates.example.com/feed");
//! let client = HttpFeedClient::new()
//!     .with_default_feeds(config.default_feeds.clone());
//! let installer = PackageInstaller::new(config, FileNameReader::new(), client.clone(), client);
//!
//! let source = installer
//!     .install(InstallRequest::new("acme.webapi.templates"), &CancellationToken::new())
//!     .await?;
//! ```

pub mod config;
pub mod feed;
pub mod installer;
pub mod logging;
pub mod package;

/// Version of the stencil library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
