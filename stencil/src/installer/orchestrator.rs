//! Installation orchestrator for template packages.
//!
//! [`PackageInstaller`] drives the install pipeline — validate, resolve
//! source, acquire, stage, record — and converts every foreseeable
//! failure into the [`InstallerError`] taxonomy at the operation
//! boundary. Update is uninstall-then-reinstall; update checks fan out
//! one concurrent lookup per source.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use semver::Version;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::InstallerConfig;
use crate::package::is_valid_package_id;

use super::keys;
use super::local::InstallRoot;
use super::record::{
    ForeignSource, ManagedSource, PackageSource, PersistedRecord, ARCHIVE_INSTALLER_ID,
};
use super::request::InstallRequest;
use super::resolver::{resolve_installation_mode, InstallationMode};
use super::traits::{ArchiveReader, FeedDownloader, PackageInfo, UpdateFeed};
use super::{InstallerError, InstallerResult};

/// Result of an install operation.
pub type InstallResult = InstallerResult<ManagedSource>;
/// Result of an uninstall operation.
pub type UninstallResult = InstallerResult<()>;
/// Result of an update operation.
pub type UpdateResult = InstallerResult<ManagedSource>;
/// Result of a single update-check lookup.
pub type CheckUpdateResult = InstallerResult<UpdateCheck>;

/// Answer for one source in a batch update check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCheck {
    /// Package identifier the lookup ran for.
    pub identifier: String,
    /// Version currently installed.
    pub installed: Version,
    /// Newest version the feed offers.
    pub latest: Version,
    /// True when the installed version is already the newest.
    pub is_latest: bool,
}

/// Orchestrates the lifecycle of archive template packages.
///
/// Generic over its three external collaborators so tests and hosts can
/// substitute implementations:
///
/// - `R` reads archive metadata
/// - `D` downloads packages from feeds
/// - `U` answers latest-version lookups
pub struct PackageInstaller<R, D, U> {
    reader: R,
    downloader: D,
    update_feed: Arc<U>,
    install_root: InstallRoot,
}

impl<R, D, U> PackageInstaller<R, D, U>
where
    R: ArchiveReader,
    D: FeedDownloader,
    U: UpdateFeed + 'static,
{
    /// Create an installer over the given collaborators.
    pub fn new(config: InstallerConfig, reader: R, downloader: D, update_feed: U) -> Self {
        Self {
            reader,
            downloader,
            update_feed: Arc::new(update_feed),
            install_root: InstallRoot::new(config.install_root),
        }
    }

    /// The directory packages are staged into.
    pub fn install_root(&self) -> &Path {
        self.install_root.path()
    }

    /// Check whether a request is eligible for installation.
    ///
    /// A request is eligible when its identifier is a readable local
    /// archive (the version field is ignored — archives are
    /// self-describing), or when the identifier is a syntactically valid
    /// package name and the version, if supplied, parses as a semantic
    /// version. Emits a trace for each validation outcome and never
    /// panics.
    pub fn can_install(&self, request: &InstallRequest) -> bool {
        if let InstallationMode::LocalArchive(path) =
            resolve_installation_mode(&request.identifier)
        {
            match self.reader.read_metadata(&path) {
                Ok(metadata) => {
                    trace!(
                        identifier = %request.identifier,
                        package = %metadata.identifier,
                        version = %metadata.version,
                        "request is an installable local archive"
                    );
                    return true;
                }
                Err(e) => {
                    debug!(
                        identifier = %request.identifier,
                        error = %e,
                        "local file is not a readable archive"
                    );
                }
            }
        }

        if !is_valid_package_id(&request.identifier) {
            debug!(identifier = %request.identifier, "identifier is not a valid package name");
            return false;
        }

        if let Some(version) = request.version.as_deref() {
            if !version.is_empty() && Version::parse(version).is_err() {
                debug!(
                    identifier = %request.identifier,
                    version,
                    "requested version does not parse"
                );
                return false;
            }
        }

        trace!(identifier = %request.identifier, "request is an installable feed package");
        true
    }

    /// Install a template package.
    ///
    /// Strictly sequential: validate, resolve local vs. remote, acquire
    /// and stage the archive, then assemble the managed source. At most
    /// one file is written; no partial source is ever returned on
    /// failure.
    pub async fn install(
        &self,
        request: InstallRequest,
        cancel: &CancellationToken,
    ) -> InstallResult {
        if !self.can_install(&request) {
            return Err(InstallerError::unsupported(format!(
                "'{}' is neither a readable local archive nor a valid package name with a valid version",
                request.identifier
            )));
        }

        if cancel.is_cancelled() {
            return Err(InstallerError::Generic("operation cancelled".to_string()));
        }

        info!(
            identifier = %request.identifier,
            version = request.version.as_deref().unwrap_or("latest"),
            "installing template package"
        );

        let info = match resolve_installation_mode(&request.identifier) {
            InstallationMode::LocalArchive(path) => self.acquire_local(&path, cancel)?,
            InstallationMode::RemoteFeed => self.acquire_remote(&request, cancel).await?,
        };

        let source = self.build_source(info);
        info!(
            identifier = source.identifier(),
            mount = source.mount_point_uri(),
            "template package installed"
        );
        Ok(source)
    }

    /// Remove an installed package.
    ///
    /// Only sources this installer produced are accepted; the staged
    /// archive file is deleted, without retry.
    pub async fn uninstall(
        &self,
        source: &PackageSource,
        cancel: &CancellationToken,
    ) -> UninstallResult {
        let managed = match source {
            PackageSource::Archive(managed) => managed,
            PackageSource::Foreign(foreign) => {
                return Err(foreign_source_error(foreign));
            }
        };

        if cancel.is_cancelled() {
            return Err(InstallerError::Generic("operation cancelled".to_string()));
        }

        info!(
            identifier = managed.identifier(),
            mount = managed.mount_point_uri(),
            "uninstalling template package"
        );
        self.install_root
            .remove_staged(Path::new(managed.mount_point_uri()))
    }

    /// Update an installed package to `target_version`.
    ///
    /// Update is uninstall-then-reinstall, never an in-place patch. A
    /// malformed or empty target version is rejected before the
    /// uninstall runs, and so is a source installed from a local archive
    /// file — its rebuilt request would name the package, not the
    /// original file, so the reinstall could never succeed and the
    /// uninstall would only destroy the staged copy. An uninstall
    /// failure is returned verbatim and the reinstall is never
    /// attempted, so two copies of the same logical package are never
    /// installed side by side. When the uninstall succeeds and the
    /// reinstall then fails, the package is left uninstalled with no
    /// replacement and the caller sees the install error.
    pub async fn update(
        &self,
        source: &PackageSource,
        target_version: &str,
        cancel: &CancellationToken,
    ) -> UpdateResult {
        let target =
            Version::parse(target_version).map_err(|_| InstallerError::MalformedVersion {
                version: target_version.to_string(),
            })?;

        let managed = match source {
            PackageSource::Archive(managed) => managed,
            PackageSource::Foreign(foreign) => {
                return Err(foreign_source_error(foreign));
            }
        };

        if managed.is_local() {
            debug!(
                identifier = managed.identifier(),
                "update of a local-archive source rejected before uninstall"
            );
            return Err(InstallerError::unsupported(format!(
                "'{}' was installed from a local archive; install the new archive file instead",
                managed.identifier()
            )));
        }

        info!(
            identifier = managed.identifier(),
            target = %target,
            "updating template package"
        );

        self.uninstall(source, cancel).await?;

        let mut request =
            InstallRequest::new(managed.identifier().to_string()).with_version(target.to_string());
        if let Some(feed) = managed.feed_uri() {
            if !feed.is_empty() {
                request = request.with_detail(keys::FEED_SOURCES, feed);
            }
        }

        self.install(request, cancel).await
    }

    /// Look up the latest available version for each source.
    ///
    /// One concurrent lookup per source; the call returns only once
    /// every lookup has settled, and the output list matches the input
    /// order slot for slot. A foreign source yields an
    /// unsupported-request entry without touching the feed, and no
    /// lookup failure suppresses its siblings.
    pub async fn check_updates(
        &self,
        sources: &[PackageSource],
        cancel: &CancellationToken,
    ) -> Vec<CheckUpdateResult> {
        let mut results: Vec<Option<CheckUpdateResult>> = Vec::with_capacity(sources.len());
        results.resize_with(sources.len(), || None);

        let mut lookups = JoinSet::new();

        for (index, source) in sources.iter().enumerate() {
            let managed = match source {
                PackageSource::Archive(managed) => managed,
                PackageSource::Foreign(foreign) => {
                    results[index] = Some(Err(foreign_source_error(foreign)));
                    continue;
                }
            };

            let Some(current) = managed.version() else {
                results[index] = Some(Err(InstallerError::unsupported(format!(
                    "source at {} has no recorded version",
                    managed.mount_point_uri()
                ))));
                continue;
            };

            // Pre-fill the slot so a lookup that dies still leaves the
            // output aligned with the input.
            results[index] = Some(Err(InstallerError::Generic(
                "update check did not complete".to_string(),
            )));

            let feed = Arc::clone(&self.update_feed);
            let identifier = managed.identifier().to_string();
            let feed_hint = managed.feed_uri().map(str::to_string);
            let cancel = cancel.clone();

            lookups.spawn(async move {
                let outcome = feed
                    .latest(&identifier, &current, feed_hint.as_deref(), &cancel)
                    .await
                    .map(|answer| UpdateCheck {
                        identifier: identifier.clone(),
                        installed: current.clone(),
                        latest: answer.latest,
                        is_latest: answer.is_latest,
                    });
                (index, outcome)
            });
        }

        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok((index, outcome)) => results[index] = Some(outcome),
                Err(join_error) => {
                    warn!(error = %join_error, "update lookup task failed");
                }
            }
        }

        results
            .into_iter()
            .map(|slot| slot.expect("every result slot is filled before join"))
            .collect()
    }

    /// Project a source into its durable record.
    ///
    /// Sources owned by other installers still produce a minimal record
    /// (installer id and mount point only) so mixed stores can be
    /// persisted together.
    pub fn serialize(&self, source: &PackageSource) -> PersistedRecord {
        match source {
            PackageSource::Archive(managed) => managed.to_record(),
            PackageSource::Foreign(foreign) => foreign.to_record(),
        }
    }

    /// Reconstruct a source from its durable record. Pure, no I/O.
    pub fn deserialize(&self, record: PersistedRecord) -> PackageSource {
        if record.installer_id == ARCHIVE_INSTALLER_ID {
            PackageSource::Archive(ManagedSource::from_record(record))
        } else {
            PackageSource::Foreign(ForeignSource {
                installer_id: record.installer_id,
                mount_point_uri: record.mount_point_uri,
            })
        }
    }

    fn acquire_local(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> InstallerResult<PackageInfo> {
        let metadata = self.reader.read_metadata(path)?;

        if cancel.is_cancelled() {
            return Err(InstallerError::Generic("operation cancelled".to_string()));
        }

        let staged = self.install_root.stage_local_archive(path, &metadata)?;

        Ok(PackageInfo {
            full_path: staged,
            author: metadata.author,
            package_identifier: metadata.identifier,
            package_version: metadata.version,
            feed_uri: None,
        })
    }

    async fn acquire_remote(
        &self,
        request: &InstallRequest,
        cancel: &CancellationToken,
    ) -> InstallerResult<PackageInfo> {
        let version = match request.version.as_deref() {
            None | Some("") => None,
            Some(v) => Some(Version::parse(v).map_err(|_| InstallerError::MalformedVersion {
                version: v.to_string(),
            })?),
        };

        self.install_root.ensure_exists()?;

        let feeds = request.feed_sources();
        self.downloader
            .download(
                self.install_root.path(),
                &request.identifier,
                version.as_ref(),
                &feeds,
                cancel,
            )
            .await
    }

    fn build_source(&self, info: PackageInfo) -> ManagedSource {
        let mut details = BTreeMap::new();
        details.insert(
            keys::PACKAGE_IDENTIFIER.to_string(),
            info.package_identifier,
        );
        details.insert(
            keys::PACKAGE_VERSION.to_string(),
            info.package_version.to_string(),
        );
        if let Some(author) = info.author {
            details.insert(keys::AUTHOR.to_string(), author);
        }
        match info.feed_uri {
            Some(feed) => {
                details.insert(keys::FEED_URI.to_string(), feed);
            }
            None => {
                details.insert(keys::IS_LOCAL_PACKAGE.to_string(), "true".to_string());
            }
        }

        ManagedSource::new(info.full_path.display().to_string(), details)
    }
}

fn foreign_source_error(foreign: &ForeignSource) -> InstallerError {
    InstallerError::unsupported(format!(
        "source at {} belongs to installer {}",
        foreign.mount_point_uri, foreign.installer_id
    ))
}
