//! Feed index model.
//!
//! Every feed hosts an `index.json` listing the packages it can supply
//! and the versions available for each.

use semver::Version;
use serde::{Deserialize, Serialize};

/// File name of the index document on a feed.
pub const INDEX_FILE: &str = "index.json";

/// Index of packages available on a feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedIndex {
    /// Packages the feed offers.
    #[serde(default)]
    pub packages: Vec<IndexEntry>,
}

impl FeedIndex {
    /// Find a package by identifier, case-insensitively.
    pub fn find(&self, identifier: &str) -> Option<&IndexEntry> {
        self.packages
            .iter()
            .find(|entry| entry.identifier.eq_ignore_ascii_case(identifier))
    }
}

/// One package listed on a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    /// Canonical package identifier.
    pub identifier: String,

    /// Published versions, in no particular order.
    pub versions: Vec<Version>,

    /// Package author, when the feed records one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl IndexEntry {
    /// Newest published version.
    pub fn latest(&self) -> Option<&Version> {
        self.versions.iter().max()
    }

    /// Whether a specific version is published.
    pub fn has_version(&self, version: &Version) -> bool {
        self.versions.contains(version)
    }
}
