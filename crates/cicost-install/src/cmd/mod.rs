//! Subcommand implementations

pub mod completions;
pub mod formula;
pub mod hash;
pub mod install;
pub mod resolve;
pub mod status;
pub mod verify;

use std::path::PathBuf;

use anyhow::Result;
use cicost_core::InstallerConfig;

/// Global options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Context {
    home: Option<PathBuf>,
    manifest: Option<PathBuf>,
    pub quiet: bool,
}

impl Context {
    pub fn new(home: Option<PathBuf>, manifest: Option<PathBuf>, quiet: bool) -> Self {
        Self {
            home,
            manifest,
            quiet,
        }
    }

    /// Installer configuration with the global overrides applied.
    pub fn config(&self) -> Result<InstallerConfig> {
        let mut config = match &self.home {
            Some(home) => InstallerConfig::with_home(home),
            None => InstallerConfig::from_env()?,
        };
        if let Some(manifest) = &self.manifest {
            config = config.manifest(manifest);
        }
        Ok(config)
    }
}
