//! Integration tests for the package installer.
//!
//! These tests drive the full install / update / uninstall / check
//! pipeline against mock feed collaborators and a real temp-dir install
//! root, covering:
//! - local archive installs and staging collisions
//! - remote installs with feed recording
//! - update as uninstall-then-reinstall
//! - batch update checks with ordering and failure isolation
//! - persisted record round-trips through the registry

use std::fs;
use std::path::Path;

use tokio_util::sync::CancellationToken;
use uuid::uuid;

use stencil::config::InstallerConfig;
use stencil::installer::{
    ArchiveReader, FeedDownloader, FileNameReader, ForeignSource, InstallRequest, InstallerError,
    InstallerResult, LatestVersion, PackageInfo, PackageInstaller, PackageSource, SourceRegistry,
    UpdateFeed,
};
use stencil::package::{staged_file_name, Version, DEFAULT_ARCHIVE_EXT};

// =============================================================================
// Test Helpers
// =============================================================================

/// A feed entry served by the mock feed.
#[derive(Clone)]
struct MockPackage {
    identifier: String,
    versions: Vec<Version>,
    author: Option<String>,
}

/// Mock feed acting as both downloader and update feed.
#[derive(Clone)]
struct MockFeed {
    feed_uri: String,
    packages: Vec<MockPackage>,
    /// Identifiers whose update lookups fail with a generic error.
    /// Downloads still succeed, so broken packages can be installed.
    broken_ids: Vec<String>,
}

impl MockFeed {
    fn new(feed_uri: &str) -> Self {
        Self {
            feed_uri: feed_uri.to_string(),
            packages: Vec::new(),
            broken_ids: Vec::new(),
        }
    }

    fn with_package(mut self, identifier: &str, versions: &[&str], author: Option<&str>) -> Self {
        self.packages.push(MockPackage {
            identifier: identifier.to_string(),
            versions: versions.iter().map(|v| Version::parse(v).unwrap()).collect(),
            author: author.map(str::to_string),
        });
        self
    }

    fn with_broken_id(mut self, identifier: &str) -> Self {
        self.broken_ids.push(identifier.to_string());
        self
    }

    fn find(&self, identifier: &str) -> Option<&MockPackage> {
        self.packages
            .iter()
            .find(|p| p.identifier.eq_ignore_ascii_case(identifier))
    }
}

impl FeedDownloader for MockFeed {
    async fn download(
        &self,
        install_root: &Path,
        identifier: &str,
        version: Option<&Version>,
        _feeds: &[String],
        _cancel: &CancellationToken,
    ) -> InstallerResult<PackageInfo> {
        let package = self
            .find(identifier)
            .ok_or_else(|| InstallerError::PackageNotFound {
                identifier: identifier.to_string(),
            })?;

        let chosen = match version {
            Some(requested) => {
                if !package.versions.contains(requested) {
                    return Err(InstallerError::PackageNotFound {
                        identifier: identifier.to_string(),
                    });
                }
                requested.clone()
            }
            None => package.versions.iter().max().unwrap().clone(),
        };

        let file_name = staged_file_name(&package.identifier, &chosen, DEFAULT_ARCHIVE_EXT);
        let dest = install_root.join(&file_name);
        fs::write(&dest, b"downloaded archive bytes").unwrap();

        Ok(PackageInfo {
            full_path: dest,
            author: package.author.clone(),
            package_identifier: package.identifier.clone(),
            package_version: chosen,
            feed_uri: Some(self.feed_uri.clone()),
        })
    }
}

impl UpdateFeed for MockFeed {
    async fn latest(
        &self,
        identifier: &str,
        current: &Version,
        _feed_hint: Option<&str>,
        _cancel: &CancellationToken,
    ) -> InstallerResult<LatestVersion> {
        if self.broken_ids.iter().any(|b| b == identifier) {
            return Err(InstallerError::Generic("feed exploded".to_string()));
        }

        let package = self
            .find(identifier)
            .ok_or_else(|| InstallerError::PackageNotFound {
                identifier: identifier.to_string(),
            })?;

        let latest = package.versions.iter().max().unwrap().clone();
        Ok(LatestVersion {
            is_latest: *current >= latest,
            latest,
        })
    }
}

type TestInstaller = PackageInstaller<FileNameReader, MockFeed, MockFeed>;

fn installer_with_feed(root: &Path, feed: MockFeed) -> TestInstaller {
    let config = InstallerConfig::default().with_install_root(root);
    PackageInstaller::new(config, FileNameReader::new(), feed.clone(), feed)
}

fn default_feed() -> MockFeed {
    MockFeed::new("https://templates.example.com/feed")
        .with_package("acme.webapi", &["1.0.0", "2.1.0"], Some("Acme"))
        .with_package("acme.cli", &["0.3.0"], None)
}

fn local_archive(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"local archive bytes").unwrap();
    path
}

// =============================================================================
// Local installs
// =============================================================================

#[tokio::test]
async fn test_install_local_archive() {
    let archives = tempfile::TempDir::new().unwrap();
    let root = tempfile::TempDir::new().unwrap();
    let archive = local_archive(archives.path(), "foo.1.2.3.archive");
    let installer = installer_with_feed(root.path(), default_feed());
    let cancel = CancellationToken::new();

    let request = InstallRequest::new(archive.to_str().unwrap());
    let source = installer.install(request, &cancel).await.unwrap();

    assert_eq!(source.identifier(), "foo");
    assert_eq!(source.version(), Some(Version::new(1, 2, 3)));
    assert!(source.is_local());
    assert!(Path::new(source.mount_point_uri()).exists());
    // The original archive is copied, not moved.
    assert!(archive.exists());
}

#[tokio::test]
async fn test_second_local_install_collides() {
    let archives = tempfile::TempDir::new().unwrap();
    let root = tempfile::TempDir::new().unwrap();
    let archive = local_archive(archives.path(), "foo.1.2.3.tpkg");
    let installer = installer_with_feed(root.path(), default_feed());
    let cancel = CancellationToken::new();

    let first = installer
        .install(InstallRequest::new(archive.to_str().unwrap()), &cancel)
        .await
        .unwrap();
    let staged = Path::new(first.mount_point_uri()).to_path_buf();
    fs::write(&staged, b"first install").unwrap();

    let second = installer
        .install(InstallRequest::new(archive.to_str().unwrap()), &cancel)
        .await;

    assert!(matches!(
        second,
        Err(InstallerError::DownloadFailed { .. })
    ));
    // The destination from the first call is untouched.
    assert_eq!(fs::read(&staged).unwrap(), b"first install");
}

#[tokio::test]
async fn test_can_install_does_not_stage_anything() {
    let archives = tempfile::TempDir::new().unwrap();
    let root = tempfile::TempDir::new().unwrap();
    let archive = local_archive(archives.path(), "foo.1.2.3.tpkg");
    let installer = installer_with_feed(root.path(), default_feed());

    assert!(installer.can_install(&InstallRequest::new(archive.to_str().unwrap())));
    assert!(fs::read_dir(root.path()).unwrap().next().is_none());
}

// =============================================================================
// Remote installs
// =============================================================================

#[tokio::test]
async fn test_install_remote_latest_records_feed() {
    let root = tempfile::TempDir::new().unwrap();
    let installer = installer_with_feed(root.path(), default_feed());
    let cancel = CancellationToken::new();

    let source = installer
        .install(InstallRequest::new("acme.webapi"), &cancel)
        .await
        .unwrap();

    assert_eq!(source.identifier(), "acme.webapi");
    assert_eq!(source.version(), Some(Version::new(2, 1, 0)));
    assert_eq!(source.author(), Some("Acme"));
    assert_eq!(source.feed_uri(), Some("https://templates.example.com/feed"));
    assert!(!source.is_local());
    assert!(Path::new(source.mount_point_uri()).exists());
}

#[tokio::test]
async fn test_install_remote_unknown_package() {
    let root = tempfile::TempDir::new().unwrap();
    let installer = installer_with_feed(root.path(), default_feed());
    let cancel = CancellationToken::new();

    let result = installer
        .install(InstallRequest::new("nobody.home"), &cancel)
        .await;

    assert_eq!(
        result.unwrap_err(),
        InstallerError::PackageNotFound {
            identifier: "nobody.home".to_string()
        }
    );
    // Nothing was staged.
    assert!(fs::read_dir(root.path()).unwrap().next().is_none());
}

// =============================================================================
// Uninstall
// =============================================================================

#[tokio::test]
async fn test_uninstall_removes_staged_archive() {
    let root = tempfile::TempDir::new().unwrap();
    let installer = installer_with_feed(root.path(), default_feed());
    let cancel = CancellationToken::new();

    let source = installer
        .install(InstallRequest::new("acme.cli"), &cancel)
        .await
        .unwrap();
    let mount = source.mount_point_uri().to_string();

    installer
        .uninstall(&PackageSource::Archive(source), &cancel)
        .await
        .unwrap();

    assert!(!Path::new(&mount).exists());
}

#[tokio::test]
async fn test_uninstall_foreign_source_rejected() {
    let root = tempfile::TempDir::new().unwrap();
    let installer = installer_with_feed(root.path(), default_feed());
    let cancel = CancellationToken::new();

    let foreign = PackageSource::Foreign(ForeignSource {
        installer_id: uuid!("00000000-0000-0000-0000-0000000000aa"),
        mount_point_uri: "/elsewhere/pkg".to_string(),
    });

    assert!(matches!(
        installer.uninstall(&foreign, &cancel).await,
        Err(InstallerError::UnsupportedRequest { .. })
    ));
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update_replaces_installed_version() {
    let root = tempfile::TempDir::new().unwrap();
    let installer = installer_with_feed(root.path(), default_feed());
    let cancel = CancellationToken::new();

    let source = installer
        .install(InstallRequest::new("acme.webapi").with_version("1.0.0"), &cancel)
        .await
        .unwrap();
    let old_mount = source.mount_point_uri().to_string();

    let updated = installer
        .update(&PackageSource::Archive(source), "2.1.0", &cancel)
        .await
        .unwrap();

    // Equivalent to uninstall followed by install at the target version.
    assert_eq!(updated.version(), Some(Version::new(2, 1, 0)));
    assert!(!Path::new(&old_mount).exists());
    assert!(Path::new(updated.mount_point_uri()).exists());
}

#[tokio::test]
async fn test_update_propagates_uninstall_error_verbatim() {
    let root = tempfile::TempDir::new().unwrap();
    let installer = installer_with_feed(root.path(), default_feed());
    let cancel = CancellationToken::new();

    let source = installer
        .install(InstallRequest::new("acme.webapi").with_version("1.0.0"), &cancel)
        .await
        .unwrap();

    // Break the uninstall step by deleting the staged file out from
    // under the installer.
    fs::remove_file(source.mount_point_uri()).unwrap();
    let source = PackageSource::Archive(source);

    let uninstall_error = installer.uninstall(&source, &cancel).await.unwrap_err();
    let update_error = installer.update(&source, "2.1.0", &cancel).await.unwrap_err();

    assert_eq!(update_error, uninstall_error);
    // The install step never ran: no archive at the target version.
    let target = root
        .path()
        .join(staged_file_name("acme.webapi", &Version::new(2, 1, 0), DEFAULT_ARCHIVE_EXT));
    assert!(!target.exists());
}

#[tokio::test]
async fn test_update_rejects_empty_target_version() {
    let root = tempfile::TempDir::new().unwrap();
    let installer = installer_with_feed(root.path(), default_feed());
    let cancel = CancellationToken::new();

    let source = installer
        .install(InstallRequest::new("acme.webapi").with_version("1.0.0"), &cancel)
        .await
        .unwrap();
    let mount = source.mount_point_uri().to_string();
    let source = PackageSource::Archive(source);

    let result = installer.update(&source, "", &cancel).await;

    assert!(matches!(
        result,
        Err(InstallerError::MalformedVersion { .. })
    ));
    // The uninstall never ran for a malformed target.
    assert!(Path::new(&mount).exists());
}

#[tokio::test]
async fn test_update_local_source_is_rejected() {
    let archives = tempfile::TempDir::new().unwrap();
    let root = tempfile::TempDir::new().unwrap();
    let archive = local_archive(archives.path(), "foo.1.2.3.tpkg");
    let installer = installer_with_feed(root.path(), default_feed());
    let cancel = CancellationToken::new();

    let source = installer
        .install(InstallRequest::new(archive.to_str().unwrap()), &cancel)
        .await
        .unwrap();
    let mount = source.mount_point_uri().to_string();
    let source = PackageSource::Archive(source);

    let result = installer.update(&source, "2.0.0", &cancel).await;

    // A local-archive source cannot be re-acquired from a feed, so the
    // update is refused before anything is uninstalled.
    assert!(matches!(
        result,
        Err(InstallerError::UnsupportedRequest { .. })
    ));
    assert!(Path::new(&mount).exists());
}

// =============================================================================
// Batch update checks
// =============================================================================

#[tokio::test]
async fn test_check_updates_preserves_order_and_isolates_failures() {
    let root = tempfile::TempDir::new().unwrap();
    let feed = default_feed()
        .with_package("acme.broken", &["1.0.0"], None)
        .with_broken_id("acme.broken");
    let installer = installer_with_feed(root.path(), feed);
    let cancel = CancellationToken::new();

    let outdated = installer
        .install(InstallRequest::new("acme.webapi").with_version("1.0.0"), &cancel)
        .await
        .unwrap();
    let current = installer
        .install(InstallRequest::new("acme.cli"), &cancel)
        .await
        .unwrap();
    let broken = installer
        .install(InstallRequest::new("acme.broken"), &cancel)
        .await
        .unwrap();

    let sources = vec![
        PackageSource::Archive(outdated),
        PackageSource::Foreign(ForeignSource {
            installer_id: uuid!("00000000-0000-0000-0000-0000000000bb"),
            mount_point_uri: "/elsewhere/pkg".to_string(),
        }),
        PackageSource::Archive(broken),
        PackageSource::Archive(current),
    ];

    let results = installer.check_updates(&sources, &cancel).await;
    assert_eq!(results.len(), sources.len());

    // Slot 0: update available.
    let check = results[0].as_ref().unwrap();
    assert_eq!(check.identifier, "acme.webapi");
    assert_eq!(check.installed, Version::new(1, 0, 0));
    assert_eq!(check.latest, Version::new(2, 1, 0));
    assert!(!check.is_latest);

    // Slot 1: foreign source rejected locally.
    assert!(matches!(
        results[1],
        Err(InstallerError::UnsupportedRequest { .. })
    ));

    // Slot 2: the broken lookup fails without touching its siblings.
    assert_eq!(
        results[2],
        Err(InstallerError::Generic("feed exploded".to_string()))
    );

    // Slot 3: already on the latest version.
    let check = results[3].as_ref().unwrap();
    assert_eq!(check.identifier, "acme.cli");
    assert!(check.is_latest);
}

#[tokio::test]
async fn test_check_updates_empty_input() {
    let root = tempfile::TempDir::new().unwrap();
    let installer = installer_with_feed(root.path(), default_feed());
    let cancel = CancellationToken::new();

    let results = installer.check_updates(&[], &cancel).await;
    assert!(results.is_empty());
}

// =============================================================================
// Persistence round-trip
// =============================================================================

#[tokio::test]
async fn test_registry_round_trip_reconstructs_source() {
    let root = tempfile::TempDir::new().unwrap();
    let installer = installer_with_feed(root.path(), default_feed());
    let registry = SourceRegistry::in_root(root.path());
    let cancel = CancellationToken::new();

    let source = installer
        .install(InstallRequest::new("acme.webapi"), &cancel)
        .await
        .unwrap();
    let original = PackageSource::Archive(source);

    registry.upsert(installer.serialize(&original)).unwrap();

    let records = registry.load().unwrap();
    assert_eq!(records.len(), 1);

    let restored = installer.deserialize(records.into_iter().next().unwrap());
    assert_eq!(restored, original);
}

#[tokio::test]
async fn test_registry_keeps_foreign_records() {
    let root = tempfile::TempDir::new().unwrap();
    let installer = installer_with_feed(root.path(), default_feed());
    let registry = SourceRegistry::in_root(root.path());

    let foreign = PackageSource::Foreign(ForeignSource {
        installer_id: uuid!("00000000-0000-0000-0000-0000000000cc"),
        mount_point_uri: "/elsewhere/pkg".to_string(),
    });

    registry.upsert(installer.serialize(&foreign)).unwrap();

    let records = registry.load().unwrap();
    let restored = installer.deserialize(records.into_iter().next().unwrap());
    assert_eq!(restored, foreign);
}

// =============================================================================
// Reader behavior at the boundary
// =============================================================================

#[test]
fn test_reader_error_kind_for_malformed_archive() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = local_archive(dir.path(), "no-version-here.tpkg");

    let err = FileNameReader::new().read_metadata(&path).unwrap_err();
    assert!(matches!(err, InstallerError::InvalidPackage { .. }));
}
