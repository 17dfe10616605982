//! Durable registry of persisted records in the install root.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use super::record::PersistedRecord;
use super::{InstallerError, InstallerResult};

/// File name of the registry inside the install root.
pub const REGISTRY_FILE: &str = ".stencil-sources.json";

/// Load/save store for persisted records.
///
/// The registry is a JSON array of [`PersistedRecord`]s; records from
/// other installers are kept verbatim so mixed stores survive a
/// load/save cycle.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    path: PathBuf,
}

impl SourceRegistry {
    /// Registry for the given install root.
    pub fn in_root(root: &Path) -> Self {
        Self {
            path: root.join(REGISTRY_FILE),
        }
    }

    /// Path of the registry file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all records. A missing registry file is an empty registry.
    pub fn load(&self) -> InstallerResult<Vec<PersistedRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            error!(path = %self.path.display(), error = %e, "failed to read registry");
            InstallerError::Generic(format!("cannot read {}: {}", self.path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            error!(path = %self.path.display(), error = %e, "registry is malformed");
            InstallerError::Generic(format!("malformed registry {}: {}", self.path.display(), e))
        })
    }

    /// Replace the registry contents.
    pub fn save(&self, records: &[PersistedRecord]) -> InstallerResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                InstallerError::Generic(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let json = serde_json::to_string_pretty(records)
            .map_err(|e| InstallerError::Generic(format!("cannot encode registry: {}", e)))?;

        fs::write(&self.path, json).map_err(|e| {
            error!(path = %self.path.display(), error = %e, "failed to write registry");
            InstallerError::Generic(format!("cannot write {}: {}", self.path.display(), e))
        })?;

        debug!(path = %self.path.display(), count = records.len(), "saved registry");
        Ok(())
    }

    /// Insert a record, replacing any existing record with the same
    /// mount point.
    pub fn upsert(&self, record: PersistedRecord) -> InstallerResult<()> {
        let mut records = self.load()?;
        records.retain(|r| r.mount_point_uri != record.mount_point_uri);
        records.push(record);
        self.save(&records)
    }

    /// Remove the record with the given mount point, if present.
    pub fn remove(&self, mount_point_uri: &str) -> InstallerResult<()> {
        let mut records = self.load()?;
        records.retain(|r| r.mount_point_uri != mount_point_uri);
        self.save(&records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::record::ARCHIVE_INSTALLER_ID;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn record(mount: &str) -> PersistedRecord {
        PersistedRecord {
            installer_id: ARCHIVE_INSTALLER_ID,
            mount_point_uri: mount.to_string(),
            last_change_time: Utc::now(),
            details: BTreeMap::new(),
        }
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let temp = TempDir::new().unwrap();
        let registry = SourceRegistry::in_root(temp.path());
        assert!(registry.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let registry = SourceRegistry::in_root(temp.path());

        let records = vec![record("/a"), record("/b")];
        registry.save(&records).unwrap();

        assert_eq!(registry.load().unwrap(), records);
    }

    #[test]
    fn test_upsert_replaces_same_mount() {
        let temp = TempDir::new().unwrap();
        let registry = SourceRegistry::in_root(temp.path());

        registry.upsert(record("/a")).unwrap();
        registry.upsert(record("/a")).unwrap();
        registry.upsert(record("/b")).unwrap();

        assert_eq!(registry.load().unwrap().len(), 2);
    }

    #[test]
    fn test_remove() {
        let temp = TempDir::new().unwrap();
        let registry = SourceRegistry::in_root(temp.path());

        registry.upsert(record("/a")).unwrap();
        registry.upsert(record("/b")).unwrap();
        registry.remove("/a").unwrap();

        let remaining = registry.load().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].mount_point_uri, "/b");
    }

    #[test]
    fn test_malformed_registry_is_error() {
        let temp = TempDir::new().unwrap();
        let registry = SourceRegistry::in_root(temp.path());
        fs::write(registry.path(), "not json").unwrap();

        assert!(matches!(
            registry.load().unwrap_err(),
            InstallerError::Generic(_)
        ));
    }
}
