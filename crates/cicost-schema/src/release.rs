//! Release descriptors and the flat lookup table built from them.

use std::collections::BTreeMap;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::arch::{Arch, Os};
use crate::hash::Sha256Digest;
use crate::manifest::ManifestError;

/// Lookup key of a [`ReleaseDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseKey {
    /// Release version
    pub version: Version,
    /// Target operating system
    pub os: Os,
    /// Target architecture
    pub arch: Arch,
}

/// One downloadable archive: a release built for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDescriptor {
    /// Release version (e.g., `0.2.0`)
    pub version: Version,
    /// Target operating system
    pub os: Os,
    /// Target architecture
    pub arch: Arch,
    /// Download URL of the archive
    pub url: String,
    /// Pinned SHA-256 of the archive bytes
    pub sha256: Sha256Digest,
}

impl ReleaseDescriptor {
    /// The `(version, os, arch)` key of this descriptor.
    pub fn key(&self) -> ReleaseKey {
        ReleaseKey {
            version: self.version.clone(),
            os: self.os,
            arch: self.arch,
        }
    }

    /// Last path segment of the download URL.
    pub fn archive_name(&self) -> &str {
        self.url.split('/').next_back().unwrap_or("")
    }

    /// Whether the URL names the version, OS asset token and architecture.
    pub fn url_encodes_key(&self) -> bool {
        self.url.contains(&self.version.to_string())
            && self.url.contains(self.os.asset_token())
            && self.url.contains(self.arch.as_str())
    }
}

/// Immutable table of release descriptors keyed by `(version, os, arch)`.
///
/// Each key maps to exactly one descriptor. Supporting a new platform means
/// adding a row, not a branch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseTable {
    entries: BTreeMap<ReleaseKey, ReleaseDescriptor>,
}

impl ReleaseTable {
    /// Build a table, rejecting duplicate keys and URLs that do not encode
    /// their key.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::DuplicateEntry`] or
    /// [`ManifestError::UrlMismatch`].
    pub fn new(
        descriptors: impl IntoIterator<Item = ReleaseDescriptor>,
    ) -> Result<Self, ManifestError> {
        let mut entries = BTreeMap::new();
        for descriptor in descriptors {
            if !descriptor.url_encodes_key() {
                return Err(ManifestError::UrlMismatch {
                    url: descriptor.url,
                    version: descriptor.version.to_string(),
                    os: descriptor.os,
                    arch: descriptor.arch,
                });
            }
            let key = descriptor.key();
            if entries.contains_key(&key) {
                return Err(ManifestError::DuplicateEntry {
                    version: key.version.to_string(),
                    os: key.os,
                    arch: key.arch,
                });
            }
            entries.insert(key, descriptor);
        }
        Ok(Self { entries })
    }

    /// Look up the descriptor for one platform of one version.
    pub fn get(&self, version: &Version, os: Os, arch: Arch) -> Option<&ReleaseDescriptor> {
        self.entries.get(&ReleaseKey {
            version: version.clone(),
            os,
            arch,
        })
    }

    /// Whether any platform of `version` is published.
    pub fn has_version(&self, version: &Version) -> bool {
        self.entries.keys().any(|k| &k.version == version)
    }

    /// All descriptors of one version, in `(os, arch)` order.
    pub fn for_version<'a>(
        &'a self,
        version: &'a Version,
    ) -> impl Iterator<Item = &'a ReleaseDescriptor> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| &k.version == version)
            .map(|(_, d)| d)
    }

    /// Distinct versions, oldest first.
    pub fn versions(&self) -> Vec<&Version> {
        let mut versions: Vec<&Version> = self.entries.keys().map(|k| &k.version).collect();
        versions.dedup();
        versions
    }

    /// Newest published version.
    pub fn latest(&self) -> Option<&Version> {
        self.entries.keys().next_back().map(|k| &k.version)
    }

    /// Iterate over every descriptor in key order.
    pub fn iter(&self) -> impl Iterator<Item = &ReleaseDescriptor> {
        self.entries.values()
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no descriptors.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(version: &str, os: Os, arch: Arch) -> ReleaseDescriptor {
        ReleaseDescriptor {
            version: Version::parse(version).unwrap(),
            os,
            arch,
            url: format!(
                "https://example.com/v{version}/cicost_{version}_{}_{}.tar.gz",
                os.asset_token(),
                arch
            ),
            sha256: Sha256Digest::new("a".repeat(64)).unwrap(),
        }
    }

    #[test]
    fn lookup_is_keyed_by_version_os_arch() {
        let table = ReleaseTable::new([
            descriptor("0.1.0", Os::Linux, Arch::Amd64),
            descriptor("0.2.0", Os::Linux, Arch::Arm64),
            descriptor("0.2.0", Os::Linux, Arch::Amd64),
        ])
        .unwrap();

        let v2 = Version::new(0, 2, 0);
        let d = table.get(&v2, Os::Linux, Arch::Arm64).unwrap();
        assert!(d.url.ends_with("cicost_0.2.0_linux_arm64.tar.gz"));
        assert!(table.get(&v2, Os::MacOs, Arch::Arm64).is_none());
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let err = ReleaseTable::new([
            descriptor("0.2.0", Os::MacOs, Arch::Arm64),
            descriptor("0.2.0", Os::MacOs, Arch::Arm64),
        ])
        .unwrap_err();
        assert!(matches!(err, ManifestError::DuplicateEntry { .. }));
    }

    #[test]
    fn url_must_encode_key() {
        let mut d = descriptor("0.2.0", Os::Linux, Arch::Arm64);
        d.url = "https://example.com/cicost_0.2.0_linux_amd64.tar.gz".to_string();
        let err = ReleaseTable::new([d]).unwrap_err();
        assert!(matches!(err, ManifestError::UrlMismatch { .. }));
    }

    #[test]
    fn versions_are_distinct_and_sorted() {
        let table = ReleaseTable::new([
            descriptor("0.10.0", Os::Linux, Arch::Amd64),
            descriptor("0.2.0", Os::Linux, Arch::Arm64),
            descriptor("0.2.0", Os::MacOs, Arch::Arm64),
        ])
        .unwrap();

        let versions: Vec<String> = table.versions().iter().map(ToString::to_string).collect();
        assert_eq!(versions, ["0.2.0", "0.10.0"]);
        assert_eq!(table.latest(), Some(&Version::new(0, 10, 0)));
        assert_eq!(table.for_version(&Version::new(0, 2, 0)).count(), 2);
        assert!(!table.has_version(&Version::new(0, 1, 0)));
    }

    #[test]
    fn archive_name_is_last_segment() {
        let d = descriptor("0.2.0", Os::MacOs, Arch::Amd64);
        assert_eq!(d.archive_name(), "cicost_0.2.0_darwin_amd64.tar.gz");
    }
}
