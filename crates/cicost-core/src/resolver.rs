//! Descriptor resolution: `(version, os, arch)` to one table row.

use cicost_schema::{Arch, Os, ReleaseDescriptor, ReleaseTable, parse_version};
use tracing::warn;

use crate::error::InstallError;

/// Target platform of an install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
    /// The architecture name that was coerced to `amd64`, if any.
    pub arch_fallback: Option<String>,
}

impl Platform {
    /// Interpret explicit platform names.
    ///
    /// The OS must be supported. The architecture never fails: non-ARM
    /// names, including unknown ones, select `amd64` and are recorded in
    /// [`arch_fallback`](Self::arch_fallback).
    pub fn from_names(os: &str, arch: &str) -> Result<Self, InstallError> {
        let parsed_os = os
            .parse::<Os>()
            .map_err(|_| InstallError::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            })?;

        let resolved = Arch::detect(arch);
        let arch_fallback = if Arch::is_recognized(arch) || resolved == Arch::Arm64 {
            None
        } else {
            warn!(
                requested = arch,
                fallback = %resolved,
                "unrecognized architecture, using the amd64 release"
            );
            Some(arch.to_string())
        };

        Ok(Self {
            os: parsed_os,
            arch: resolved,
            arch_fallback,
        })
    }

    /// Use the given names where present and the running host otherwise.
    pub fn detect(os: Option<&str>, arch: Option<&str>) -> Result<Self, InstallError> {
        Self::from_names(
            os.unwrap_or(std::env::consts::OS),
            arch.unwrap_or(std::env::consts::ARCH),
        )
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// Find the descriptor for `version` on `os`/`arch`.
///
/// # Errors
///
/// `InvalidVersion` for a blank or non-semver string, `UnknownVersion` when
/// no platform of the version is published, `UnsupportedPlatform` when the
/// version exists but not for this platform.
pub fn resolve_descriptor<'t>(
    table: &'t ReleaseTable,
    version: &str,
    os: Os,
    arch: Arch,
) -> Result<&'t ReleaseDescriptor, InstallError> {
    let parsed = parse_version(version)?;

    if !table.has_version(&parsed) {
        return Err(InstallError::UnknownVersion {
            version: parsed.to_string(),
            available: available_versions(table),
        });
    }

    table
        .get(&parsed, os, arch)
        .ok_or_else(|| InstallError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        })
}

/// The requested version, or the newest one in the table.
pub fn pick_version(table: &ReleaseTable, requested: Option<&str>) -> Result<String, InstallError> {
    match requested {
        Some(v) => Ok(v.to_string()),
        None => table
            .latest()
            .map(ToString::to_string)
            .ok_or_else(|| InstallError::UnknownVersion {
                version: "latest".to_string(),
                available: available_versions(table),
            }),
    }
}

fn available_versions(table: &ReleaseTable) -> String {
    let versions: Vec<String> = table.versions().iter().map(ToString::to_string).collect();
    if versions.is_empty() {
        "none".to_string()
    } else {
        versions.join(", ")
    }
}
