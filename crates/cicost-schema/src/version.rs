//! Release version parsing.

use thiserror::Error;

/// A requested version string that is not usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// Nothing was supplied.
    #[error("Version must not be empty")]
    Empty,

    /// The string is not a semantic version.
    #[error("Invalid version '{input}': {reason}")]
    Invalid {
        /// The rejected input
        input: String,
        /// Parser message
        reason: String,
    },
}

/// Parse a release version, tolerating a leading `v` as used in git tags.
///
/// # Errors
///
/// Returns [`VersionError::Empty`] for blank input and
/// [`VersionError::Invalid`] when the remainder is not semver.
///
/// # Example
///
/// ```
/// use cicost_schema::parse_version;
///
/// assert_eq!(parse_version("v0.2.0").unwrap().to_string(), "0.2.0");
/// assert!(parse_version("").is_err());
/// ```
pub fn parse_version(input: &str) -> Result<semver::Version, VersionError> {
    let trimmed = input.trim();
    let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
    if bare.is_empty() {
        return Err(VersionError::Empty);
    }
    semver::Version::parse(bare).map_err(|e| VersionError::Invalid {
        input: input.to_string(),
        reason: e.to_string(),
    })
}
