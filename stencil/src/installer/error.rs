//! Error taxonomy for installer operations.

use thiserror::Error;

/// Result alias for installer operations.
pub type InstallerResult<T> = Result<T, InstallerError>;

/// Errors surfaced by installer operations.
///
/// Every foreseeable failure is caught at the operation boundary and
/// converted into one of these kinds; the full underlying detail is
/// emitted to the diagnostics sink before the summarized error is
/// returned. Variants carry string reasons so results stay cloneable and
/// comparable across the update pipeline, which propagates an uninstall
/// failure verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InstallerError {
    /// The request or source is not one this installer can act on.
    #[error("unsupported request: {reason}")]
    UnsupportedRequest {
        /// What made the request ineligible.
        reason: String,
    },

    /// The package could not be located on any candidate feed.
    #[error("package '{identifier}' not found")]
    PackageNotFound {
        /// The requested package identifier.
        identifier: String,
    },

    /// A feed URI is malformed or the feed is unreachable.
    #[error("invalid feed source: {reason}")]
    InvalidSource { reason: String },

    /// The archive is unreadable or its metadata is malformed.
    #[error("invalid package: {reason}")]
    InvalidPackage { reason: String },

    /// Acquiring package bytes failed. Covers local staging collisions,
    /// copy failures, and transport errors.
    #[error("download failed: {reason}")]
    DownloadFailed { reason: String },

    /// A supplied version string does not parse as a semantic version.
    /// Raised before any I/O is attempted.
    #[error("malformed version '{version}'")]
    MalformedVersion { version: String },

    /// Catch-all for unexpected failures, carrying the underlying message.
    #[error("{0}")]
    Generic(String),
}

impl InstallerError {
    /// Shorthand for an [`InstallerError::UnsupportedRequest`].
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedRequest {
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`InstallerError::DownloadFailed`].
    pub fn download_failed(reason: impl Into<String>) -> Self {
        Self::DownloadFailed {
            reason: reason.into(),
        }
    }
}
