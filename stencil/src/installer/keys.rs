//! Detail-map key conventions.
//!
//! These keys form the stable contract surface of persisted records; other
//! tooling reads them, so the spellings here must not change.

/// Present (with value `"true"`) when the package was installed from a
/// local archive file rather than a feed.
pub const IS_LOCAL_PACKAGE: &str = "isLocalPackage";

/// Package author, when the archive carried one.
pub const AUTHOR: &str = "author";

/// Feed URI the package was acquired from.
pub const FEED_URI: &str = "feedUri";

/// Canonical package identifier.
pub const PACKAGE_IDENTIFIER: &str = "packageIdentifier";

/// Installed package version.
pub const PACKAGE_VERSION: &str = "packageVersion";

/// Request detail listing candidate feed URIs, joined with
/// [`FEED_SOURCE_SEPARATOR`].
pub const FEED_SOURCES: &str = "feedSources";

/// Separator for multi-feed values under [`FEED_SOURCES`].
pub const FEED_SOURCE_SEPARATOR: char = ';';
