//! TOML release manifest.
//!
//! ```toml
//! [[release]]
//! version = "0.2.0"
//! url_template = "https://github.com/peter941221/CICost/releases/download/v{version}/cicost_{version}_{os}_{arch}.tar.gz"
//!
//! [[release.artifact]]
//! os = "linux"
//! arch = "arm64"
//! sha256 = "64efc35f40a0896199a38a385bacb2937195af44dce4c2c8b549d1b37473fa54"
//! ```
//!
//! `{os}` expands to the asset token (`darwin` for macOS) and `{arch}` to
//! `arm64` or `amd64`. An artifact may carry an explicit `url` instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::arch::{Arch, Os};
use crate::hash::Sha256Digest;
use crate::release::{ReleaseDescriptor, ReleaseTable};
use crate::version::{VersionError, parse_version};

const PLACEHOLDERS: [&str; 3] = ["{version}", "{os}", "{arch}"];

/// Errors raised while loading a release manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The document is not valid TOML or does not match the schema.
    #[error("Failed to parse release manifest: {0}")]
    Parse(#[from] toml::de::Error),

    /// The manifest could not be rendered back to TOML.
    #[error("Failed to serialize release manifest: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A release has an unusable version string.
    #[error("Invalid release version: {0}")]
    Version(#[from] VersionError),

    /// Two rows share a `(version, os, arch)` key.
    #[error("Duplicate release entry for {version} {os}/{arch}")]
    DuplicateEntry {
        /// Release version
        version: String,
        /// Target operating system
        os: Os,
        /// Target architecture
        arch: Arch,
    },

    /// A URL does not contain the version, OS token and architecture it is
    /// filed under.
    #[error("URL '{url}' does not encode {version} {os}/{arch}")]
    UrlMismatch {
        /// Offending URL
        url: String,
        /// Release version
        version: String,
        /// Target operating system
        os: Os,
        /// Target architecture
        arch: Arch,
    },

    /// An artifact has neither its own URL nor a release template.
    #[error("No URL for {version} {os}/{arch}: set `url` or the release `url_template`")]
    MissingUrl {
        /// Release version
        version: String,
        /// Target operating system
        os: Os,
        /// Target architecture
        arch: Arch,
    },

    /// A URL template lacks one of the required placeholders.
    #[error("URL template '{template}' is missing the {placeholder} placeholder")]
    TemplatePlaceholder {
        /// Offending template
        template: String,
        /// Missing placeholder
        placeholder: &'static str,
    },

    /// A URL is not an http(s) URL.
    #[error("Invalid URL '{0}': must start with http:// or https://")]
    InvalidUrl(String),
}

/// Top-level manifest document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseManifest {
    /// Published releases
    #[serde(rename = "release", default)]
    pub releases: Vec<ReleaseEntry>,
}

/// One published version and its per-platform archives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEntry {
    /// Version string (a leading `v` is tolerated)
    pub version: String,
    /// URL pattern with `{version}`, `{os}` and `{arch}` placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_template: Option<String>,
    /// Per-platform rows
    #[serde(rename = "artifact", default)]
    pub artifacts: Vec<ArtifactEntry>,
}

/// One platform row of a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    /// Target operating system
    pub os: Os,
    /// Target architecture
    pub arch: Arch,
    /// Pinned archive digest
    pub sha256: Sha256Digest,
    /// Explicit URL, overriding the release template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ReleaseManifest {
    /// Parse a manifest document.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Parse`] on malformed TOML, invalid digests or
    /// unknown platform names.
    pub fn from_toml(content: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(content)?)
    }

    /// Render the manifest as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Serialize`] if rendering fails.
    pub fn to_toml(&self) -> Result<String, ManifestError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Expand every row into a descriptor and build the lookup table.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure: bad version, bad template,
    /// missing or non-http URL, URL not encoding its key, duplicate key.
    pub fn into_table(self) -> Result<ReleaseTable, ManifestError> {
        let mut descriptors = Vec::new();

        for release in self.releases {
            let version = parse_version(&release.version)?;
            if let Some(template) = &release.url_template {
                validate_template(template)?;
            }

            for artifact in release.artifacts {
                let url = match (&artifact.url, &release.url_template) {
                    (Some(url), _) => url.clone(),
                    (None, Some(template)) => {
                        expand_template(template, &version, artifact.os, artifact.arch)
                    }
                    (None, None) => {
                        return Err(ManifestError::MissingUrl {
                            version: version.to_string(),
                            os: artifact.os,
                            arch: artifact.arch,
                        });
                    }
                };

                if !(url.starts_with("https://") || url.starts_with("http://")) {
                    return Err(ManifestError::InvalidUrl(url));
                }

                descriptors.push(ReleaseDescriptor {
                    version: version.clone(),
                    os: artifact.os,
                    arch: artifact.arch,
                    url,
                    sha256: artifact.sha256,
                });
            }
        }

        ReleaseTable::new(descriptors)
    }
}

impl std::str::FromStr for ReleaseManifest {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_toml(s)
    }
}

/// Substitute `{version}`, `{os}` and `{arch}` in a URL template.
///
/// # Example
///
/// ```
/// use cicost_schema::{Arch, Os, manifest::expand_template};
///
/// let v = semver::Version::new(0, 2, 0);
/// let url = expand_template("https://x/cicost_{version}_{os}_{arch}.tar.gz", &v, Os::MacOs, Arch::Arm64);
/// assert_eq!(url, "https://x/cicost_0.2.0_darwin_arm64.tar.gz");
/// ```
pub fn expand_template(template: &str, version: &semver::Version, os: Os, arch: Arch) -> String {
    template
        .replace("{version}", &version.to_string())
        .replace("{os}", os.asset_token())
        .replace("{arch}", arch.as_str())
}

fn validate_template(template: &str) -> Result<(), ManifestError> {
    match PLACEHOLDERS.iter().find(|p| !template.contains(**p)) {
        Some(placeholder) => Err(ManifestError::TemplatePlaceholder {
            template: template.to_string(),
            placeholder: *placeholder,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PINNED: &str = "64efc35f40a0896199a38a385bacb2937195af44dce4c2c8b549d1b37473fa54";

    fn manifest_with(artifacts: &str) -> String {
        format!(
            r#"
[[release]]
version = "v0.2.0"
url_template = "https://github.com/peter941221/CICost/releases/download/v{{version}}/cicost_{{version}}_{{os}}_{{arch}}.tar.gz"
{artifacts}
"#
        )
    }

    #[test]
    fn expands_template_per_artifact() {
        let doc = manifest_with(&format!(
            r#"
[[release.artifact]]
os = "linux"
arch = "arm64"
sha256 = "{PINNED}"

[[release.artifact]]
os = "macos"
arch = "amd64"
sha256 = "{}"
"#,
            "b".repeat(64)
        ));

        let table = ReleaseManifest::from_toml(&doc).unwrap().into_table().unwrap();
        let v = semver::Version::new(0, 2, 0);

        let linux = table.get(&v, Os::Linux, Arch::Arm64).unwrap();
        assert_eq!(
            linux.url,
            "https://github.com/peter941221/CICost/releases/download/v0.2.0/cicost_0.2.0_linux_arm64.tar.gz"
        );
        assert_eq!(linux.sha256.as_str(), PINNED);

        let mac = table.get(&v, Os::MacOs, Arch::Amd64).unwrap();
        assert!(mac.url.ends_with("cicost_0.2.0_darwin_amd64.tar.gz"));
    }

    #[test]
    fn explicit_url_overrides_template() {
        let doc = manifest_with(&format!(
            r#"
[[release.artifact]]
os = "linux"
arch = "amd64"
sha256 = "{PINNED}"
url = "https://mirror.example.com/0.2.0/linux/amd64/cicost.tar.gz"
"#
        ));
        let table = ReleaseManifest::from_toml(&doc).unwrap().into_table().unwrap();
        let d = table.iter().next().unwrap();
        assert!(d.url.starts_with("https://mirror.example.com/"));
    }

    #[test]
    fn placeholder_digest_fails_to_parse() {
        let doc = manifest_with(
            r#"
[[release.artifact]]
os = "linux"
arch = "amd64"
sha256 = "REPLACE_WITH_REAL_SHA256"
"#,
        );
        assert!(matches!(
            ReleaseManifest::from_toml(&doc),
            Err(ManifestError::Parse(_))
        ));
    }

    #[test]
    fn unknown_arch_in_manifest_is_rejected() {
        let doc = manifest_with(&format!(
            r#"
[[release.artifact]]
os = "linux"
arch = "riscv64"
sha256 = "{PINNED}"
"#
        ));
        assert!(ReleaseManifest::from_toml(&doc).is_err());
    }

    #[test]
    fn template_without_arch_is_rejected() {
        let doc = format!(
            r#"
[[release]]
version = "0.2.0"
url_template = "https://example.com/cicost_{{version}}_{{os}}.tar.gz"

[[release.artifact]]
os = "linux"
arch = "amd64"
sha256 = "{PINNED}"
"#
        );
        let err = ReleaseManifest::from_toml(&doc)
            .unwrap()
            .into_table()
            .unwrap_err();
        assert!(matches!(
            err,
            ManifestError::TemplatePlaceholder {
                placeholder: "{arch}",
                ..
            }
        ));
    }

    #[test]
    fn artifact_without_any_url_is_rejected() {
        let doc = format!(
            r#"
[[release]]
version = "0.2.0"

[[release.artifact]]
os = "linux"
arch = "amd64"
sha256 = "{PINNED}"
"#
        );
        let err = ReleaseManifest::from_toml(&doc)
            .unwrap()
            .into_table()
            .unwrap_err();
        assert!(matches!(err, ManifestError::MissingUrl { .. }));
    }

    #[test]
    fn non_http_url_is_rejected() {
        let doc = manifest_with(&format!(
            r#"
[[release.artifact]]
os = "linux"
arch = "amd64"
sha256 = "{PINNED}"
url = "file:///tmp/cicost_0.2.0_linux_amd64.tar.gz"
"#
        ));
        let err = ReleaseManifest::from_toml(&doc)
            .unwrap()
            .into_table()
            .unwrap_err();
        assert!(matches!(err, ManifestError::InvalidUrl(_)));
    }

    #[test]
    fn empty_version_is_rejected() {
        let doc = format!(
            r#"
[[release]]
version = ""
url_template = "https://example.com/{{version}}/{{os}}/{{arch}}"

[[release.artifact]]
os = "linux"
arch = "amd64"
sha256 = "{PINNED}"
"#
        );
        let err = ReleaseManifest::from_toml(&doc)
            .unwrap()
            .into_table()
            .unwrap_err();
        assert!(matches!(err, ManifestError::Version(VersionError::Empty)));
    }

    #[test]
    fn serializes_back_to_toml() {
        let manifest = ReleaseManifest {
            releases: vec![ReleaseEntry {
                version: "0.2.0".to_string(),
                url_template: Some("https://e.com/{version}/{os}/{arch}".to_string()),
                artifacts: vec![ArtifactEntry {
                    os: Os::Linux,
                    arch: Arch::Arm64,
                    sha256: Sha256Digest::new(PINNED).unwrap(),
                    url: None,
                }],
            }],
        };
        let text = manifest.to_toml().unwrap();
        assert!(text.contains("[[release.artifact]]"));
        assert!(text.contains(PINNED));
    }
}
