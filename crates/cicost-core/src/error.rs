//! Domain-specific errors for install operations

use std::path::PathBuf;

use cicost_schema::{ManifestError, VersionError};
use thiserror::Error;

use crate::io::download::DownloadError;
use crate::io::extract::ExtractError;

/// Every way a single install attempt can end early.
///
/// All variants are terminal: the pipeline surfaces the first one and stops.
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("No cicost release is published for {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("cicost {version} is not published (available: {available})")]
    UnknownVersion { version: String, available: String },

    #[error(transparent)]
    InvalidVersion(#[from] VersionError),

    #[error("Timed out after {secs}s fetching {url}")]
    FetchTimeout { url: String, secs: u64 },

    #[error("Failed to fetch {url}: {message}")]
    Network { url: String, message: String },

    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Archive {archive} does not contain an executable named '{name}'")]
    MissingExecutable { name: String, archive: String },

    #[error("Smoke test of {} failed: {reason}", .binary.display())]
    SmokeTestFailed { binary: PathBuf, reason: String },

    #[error("Corrupt archive: {0}")]
    Archive(String),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Install receipt error: {0}")]
    Receipt(String),

    #[error("{context}: {source}")]
    Context {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl InstallError {
    /// Wrap an I/O error with a short description of what was being done.
    pub fn context(ctx: &'static str, source: std::io::Error) -> Self {
        Self::Context {
            context: ctx,
            source,
        }
    }

    /// Process exit code for this failure kind.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Io(_) | Self::Context { .. } | Self::Receipt(_) => 1,
            Self::InvalidVersion(_) | Self::Config(_) => 2,
            Self::UnsupportedPlatform { .. } => 3,
            Self::UnknownVersion { .. } => 4,
            Self::Network { .. } => 5,
            Self::FetchTimeout { .. } => 6,
            Self::ChecksumMismatch { .. } => 7,
            Self::MissingExecutable { .. } | Self::Archive(_) => 8,
            Self::SmokeTestFailed { .. } => 9,
            Self::Manifest(_) => 10,
        }
    }
}

impl From<DownloadError> for InstallError {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::Http { url, source } => Self::Network {
                url,
                message: source.to_string(),
            },
            DownloadError::Status { url, status } => Self::Network {
                url,
                message: format!("HTTP {status}"),
            },
            DownloadError::Timeout { url, secs } => Self::FetchTimeout { url, secs },
            DownloadError::HashMismatch { expected, actual } => {
                Self::ChecksumMismatch { expected, actual }
            }
            DownloadError::Io(e) => Self::Io(e),
        }
    }
}

impl From<ExtractError> for InstallError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::MissingExecutable { name, archive } => {
                Self::MissingExecutable { name, archive }
            }
            ExtractError::UnsupportedFormat(f) => Self::Archive(format!("unsupported format {f}")),
            ExtractError::Archive(msg) => Self::Archive(msg),
            ExtractError::Io(e) => Self::Io(e),
        }
    }
}
