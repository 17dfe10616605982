//! Template package installer.
//!
//! This module owns the lifecycle of archive template packages: deciding
//! whether a request is installable, acquiring package bytes from a local
//! file or a remote feed, staging them in the install root, recording an
//! installed source, and supporting update checks, updates and removal.
//!
//! # Architecture
//!
//! The orchestrator coordinates trait-abstracted collaborators:
//!
//! - [`ArchiveReader`] - extracts identifier/version/author from archives
//! - [`FeedDownloader`] - fetches and stages packages from feeds
//! - [`UpdateFeed`] - answers latest-version lookups
//!
//! Operations return typed results over the [`InstallerError`] taxonomy;
//! callers never see a panic from the regular failure paths.
//!
//! # Example
//!
//! ```ignore
//! use stencil::config::InstallerConfig;
//! use stencil::feed::HttpFeedClient;
//! use stencil::installer::{FileNameReader, InstallRequest, PackageInstaller};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = InstallerConfig::default().with_install_root("/opt/templates");
//! let client = HttpFeedClient::new();
//! let installer = PackageInstaller::new(config, FileNameReader::new(), client.clone(), client);
//!
//! let source = installer
//!     .install(InstallRequest::new("acme.webapi.templates"), &CancellationToken::new())
//!     .await?;
//! ```

mod error;
pub mod keys;
mod local;
mod orchestrator;
mod reader;
mod record;
mod registry;
mod request;
mod resolver;
mod traits;

pub use error::{InstallerError, InstallerResult};
pub use local::InstallRoot;
pub use orchestrator::{
    CheckUpdateResult, InstallResult, PackageInstaller, UninstallResult, UpdateCheck, UpdateResult,
};
pub use reader::FileNameReader;
pub use record::{
    ForeignSource, ManagedSource, PackageSource, PersistedRecord, ARCHIVE_INSTALLER_ID,
};
pub use registry::{SourceRegistry, REGISTRY_FILE};
pub use request::InstallRequest;
pub use resolver::{resolve_installation_mode, InstallationMode};
pub use traits::{ArchiveReader, FeedDownloader, LatestVersion, PackageInfo, UpdateFeed};
