//! Package naming rules and archive file name handling.
//!
//! Archive packages are named `<identifier>.<version>.<extension>`, e.g.
//! `acme.webapi.2.1.0.tpkg`. The identifier itself may contain dots, so
//! parsing scans for the split point at which the remainder is a valid
//! semantic version.

use semver::Version;

/// Default file extension for staged archive packages.
pub const DEFAULT_ARCHIVE_EXT: &str = "tpkg";

/// Maximum allowed length for a package identifier.
const MAX_IDENTIFIER_LEN: usize = 100;

/// Check whether a string is a syntactically valid feed package identifier.
///
/// Valid identifiers are non-empty, at most 100 characters, consist of
/// ASCII letters, digits, `.`, `-` and `_`, and start and end with a
/// letter or digit. A file path is never a valid identifier.
pub fn is_valid_package_id(identifier: &str) -> bool {
    if identifier.is_empty() || identifier.len() > MAX_IDENTIFIER_LEN {
        return false;
    }

    let valid_chars = identifier
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_');
    if !valid_chars {
        return false;
    }

    let first = identifier.chars().next().unwrap_or('.');
    let last = identifier.chars().next_back().unwrap_or('.');
    first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric()
}

/// Build the file name under which an archive is staged in the install root.
pub fn staged_file_name(identifier: &str, version: &Version, extension: &str) -> String {
    format!("{}.{}.{}", identifier, version, extension)
}

/// Parse an archive file name into identifier and version.
///
/// A purely alphabetic final dot-segment (`tpkg`, `archive`, ...) is the
/// file extension and is removed up front, before any version parsing —
/// otherwise semver would fold it into a prerelease tag
/// (`1.0.0-rc.1.tpkg` parses as a valid version). Dotted prerelease and
/// build tails like `rc.1` carry a digit, so they are never mistaken
/// for an extension. The remaining name is then scanned left to right
/// and the first split whose remainder parses as a semantic version
/// wins, keeping dotted identifiers unambiguous:
/// `acme.webapi.2.1.0.tpkg` yields `("acme.webapi", 2.1.0)`.
///
/// Returns `None` when no split produces a valid version.
pub fn parse_archive_file_name(file_name: &str) -> Option<(String, Version)> {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphabetic()) => {
            stem
        }
        _ => file_name,
    };

    for (pos, _) in stem.match_indices('.') {
        let identifier = &stem[..pos];
        let rest = &stem[pos + 1..];

        if let Ok(version) = Version::parse(rest) {
            return Some((identifier.to_string(), version));
        }
    }

    None
}
