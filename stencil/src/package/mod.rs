//! Template package naming and archive metadata.
//!
//! A template package is a versioned archive identified by a feed package
//! name (e.g., `acme.webapi.templates`) and a semantic version. Archives
//! staged in the install root follow the `<identifier>.<version>.<ext>`
//! naming convention, which makes a staged file self-describing without
//! opening it.
//!
//! Reading archive *contents* is out of scope for this crate; the
//! [`ArchiveReader`](crate::installer::ArchiveReader) boundary exists so a
//! host can plug in a real format reader.

mod name;
mod types;

pub use name::{
    is_valid_package_id, parse_archive_file_name, staged_file_name, DEFAULT_ARCHIVE_EXT,
};
pub use types::ArchiveMetadata;

// Re-export semver::Version for convenience
pub use semver::Version;
