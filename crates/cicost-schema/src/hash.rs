//! SHA-256 digests pinned for release archives.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Error returned when a string is not a SHA-256 hex digest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid SHA256 digest: expected 64 hex characters, got '{0}'")]
pub struct DigestError(pub String);

/// A validated SHA256 digest (64 lowercase hex characters)
///
/// Digests are validated at deserialization time, so an invalid pin in a
/// release manifest is rejected when the table loads rather than when a
/// download finishes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Create a new `Sha256Digest`, validating the input.
    ///
    /// Accepts strings with or without a `sha256:` prefix and normalises the
    /// hex to lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError`] if the hex portion is not exactly 64 ASCII hex
    /// characters.
    pub fn new(s: impl Into<String>) -> Result<Self, DigestError> {
        let s = s.into();
        let hex = s.trim();
        let hex = hex.strip_prefix("sha256:").unwrap_or(hex);

        if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DigestError(s));
        }

        Ok(Self(hex.to_lowercase()))
    }

    /// Get the digest as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare against a freshly computed hex digest, ignoring case.
    pub fn matches(&self, actual: &str) -> bool {
        self.0.eq_ignore_ascii_case(actual)
    }
}

impl<'de> Deserialize<'de> for Sha256Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Sha256Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PINNED: &str = "64efc35f40a0896199a38a385bacb2937195af44dce4c2c8b549d1b37473fa54";

    #[test]
    fn accepts_prefixed_and_uppercase() {
        let d = Sha256Digest::new(format!("sha256:{}", PINNED.to_uppercase())).unwrap();
        assert_eq!(d.as_str(), PINNED);
    }

    #[test]
    fn rejects_placeholder() {
        assert!(Sha256Digest::new("REPLACE_WITH_REAL_SHA256").is_err());
        assert!(Sha256Digest::new(&PINNED[..63]).is_err());
        assert!(Sha256Digest::new(format!("{}g", &PINNED[..63])).is_err());
    }

    #[test]
    fn matches_ignores_case() {
        let d = Sha256Digest::new(PINNED).unwrap();
        assert!(d.matches(&PINNED.to_uppercase()));
        assert!(!d.matches(&PINNED.replace('6', "7")));
    }
}
