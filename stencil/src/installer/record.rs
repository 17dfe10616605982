//! Managed source records and their durable projection.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};
use uuid::{uuid, Uuid};

use super::keys;

/// Stable identity of the archive package installer.
///
/// Stamped into every record this installer produces; deserialization
/// routes records back to their owning installer by this id.
pub const ARCHIVE_INSTALLER_ID: Uuid = uuid!("6d3cf9a4-52b0-4f61-8b13-e0a9257c4d1e");

/// Persisted record of one installed template package.
///
/// Owned exclusively by the installer once created. The identifier and
/// version of a recorded source are never mutated in place; an update
/// produces a new record and discards the old one only after the
/// replacement is durably staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedSource {
    mount_point_uri: String,
    last_change_time: DateTime<Utc>,
    details: BTreeMap<String, String>,
}

impl ManagedSource {
    /// Create a freshly installed source, stamped with the current time.
    pub(crate) fn new(mount_point_uri: String, details: BTreeMap<String, String>) -> Self {
        Self {
            mount_point_uri,
            last_change_time: Utc::now(),
            details,
        }
    }

    /// Rebuild a source from its persisted record fields.
    pub(crate) fn from_record(record: PersistedRecord) -> Self {
        Self {
            mount_point_uri: record.mount_point_uri,
            last_change_time: record.last_change_time,
            details: record.details,
        }
    }

    /// Path of the staged archive backing this source.
    pub fn mount_point_uri(&self) -> &str {
        &self.mount_point_uri
    }

    /// When this record was created.
    pub fn last_change_time(&self) -> DateTime<Utc> {
        self.last_change_time
    }

    /// The full details map.
    pub fn details(&self) -> &BTreeMap<String, String> {
        &self.details
    }

    /// Canonical package identifier.
    pub fn identifier(&self) -> &str {
        self.details
            .get(keys::PACKAGE_IDENTIFIER)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Installed version, when the detail parses.
    pub fn version(&self) -> Option<Version> {
        self.details
            .get(keys::PACKAGE_VERSION)
            .and_then(|v| Version::parse(v).ok())
    }

    /// Package author, when recorded.
    pub fn author(&self) -> Option<&str> {
        self.details.get(keys::AUTHOR).map(String::as_str)
    }

    /// Feed the package was acquired from, when recorded.
    pub fn feed_uri(&self) -> Option<&str> {
        self.details.get(keys::FEED_URI).map(String::as_str)
    }

    /// True when the package was installed from a local archive file.
    pub fn is_local(&self) -> bool {
        self.details
            .get(keys::IS_LOCAL_PACKAGE)
            .map(|v| v == "true")
            .unwrap_or(false)
    }

    /// Project this source into its durable record shape.
    pub fn to_record(&self) -> PersistedRecord {
        PersistedRecord {
            installer_id: ARCHIVE_INSTALLER_ID,
            mount_point_uri: self.mount_point_uri.clone(),
            last_change_time: self.last_change_time,
            details: self.details.clone(),
        }
    }
}

/// A record persisted by some other installer.
///
/// Carried only so mixed persisted stores round-trip without loss of the
/// fields this installer understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignSource {
    /// Identity of the installer that produced the record.
    pub installer_id: Uuid,
    /// Mount point recorded by that installer.
    pub mount_point_uri: String,
}

impl ForeignSource {
    /// Minimal durable projection: id and mount point only, empty
    /// details, default timestamp.
    pub fn to_record(&self) -> PersistedRecord {
        PersistedRecord {
            installer_id: self.installer_id,
            mount_point_uri: self.mount_point_uri.clone(),
            last_change_time: DateTime::<Utc>::UNIX_EPOCH,
            details: BTreeMap::new(),
        }
    }
}

/// A template package source as seen by the surrounding engine.
///
/// Ownership is a tagged variant checked by pattern match: operations act
/// on [`PackageSource::Archive`] and reject [`PackageSource::Foreign`]
/// with an unsupported-request error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSource {
    /// Produced and owned by the archive installer.
    Archive(ManagedSource),
    /// Recorded by another installer.
    Foreign(ForeignSource),
}

impl PackageSource {
    /// Mount point regardless of ownership.
    pub fn mount_point_uri(&self) -> &str {
        match self {
            PackageSource::Archive(source) => source.mount_point_uri(),
            PackageSource::Foreign(foreign) => &foreign.mount_point_uri,
        }
    }
}

/// Durable on-disk projection of a package source.
///
/// This shape is the stable contract other tooling may read; field names
/// must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    /// Identity of the owning installer.
    pub installer_id: Uuid,

    /// Path of the staged package.
    pub mount_point_uri: String,

    /// When the record was created.
    pub last_change_time: DateTime<Utc>,

    /// Installer-specific details.
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}
