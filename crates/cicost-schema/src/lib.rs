//! Shared types for the cicost installer.
//!
//! A release is described by a flat table of [`ReleaseDescriptor`]s keyed by
//! `(version, os, arch)`. The table is loaded from a TOML [`ReleaseManifest`]
//! and is immutable once built.

pub mod arch;
pub mod hash;
pub mod manifest;
pub mod release;
pub mod version;

// Re-exports
pub use arch::*;
pub use hash::*;
pub use manifest::{ArtifactEntry, ManifestError, ReleaseEntry, ReleaseManifest};
pub use release::{ReleaseDescriptor, ReleaseKey, ReleaseTable};
pub use version::{VersionError, parse_version};

/// Name of the executable shipped inside every release archive.
pub const BINARY_NAME: &str = "cicost";
