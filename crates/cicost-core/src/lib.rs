//! Core library for the cicost installer.
//!
//! The install flow is a strict linear pipeline:
//!
//! ```text
//! resolve -> fetch -> verify sha256 -> extract -> install (atomic rename) -> smoke test
//! ```
//!
//! Every stage either completes or returns an [`InstallError`]; nothing is
//! retried and nothing before the final rename touches the install
//! directory.

pub mod artifact;
pub mod config;
pub mod error;
pub mod formula;
pub mod install;
pub mod installer;
pub mod io;
pub mod paths;
pub mod receipt;
pub mod reporter;
pub mod resolver;
pub mod smoke;
pub mod sweep;

pub use config::InstallerConfig;
pub use error::InstallError;
pub use installer::Installer;
pub use paths::*;
pub use reporter::{NullReporter, Reporter};

pub use cicost_schema::BINARY_NAME;

/// User Agent string for core operations
pub const USER_AGENT: &str = concat!("cicost-install/", env!("CARGO_PKG_VERSION"));

/// Release table compiled into the installer.
pub const BUILTIN_MANIFEST: &str = include_str!("../releases.toml");
