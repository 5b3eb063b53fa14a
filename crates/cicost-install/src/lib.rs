//! cicost-install - verified installer for cicost
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Installs the `cicost` GitHub Actions cost analyzer from its release
//! archives. Every archive is checked against a pinned SHA256 before a single
//! byte is extracted, and the binary lands in the install directory through
//! an atomic rename.
//!
//! # Directory Layout
//!
//! ```text
//! ~/.cicost/
//! ├── bin/cicost     # Installed executable
//! ├── tmp/           # Per-run scratch directories (removed on exit)
//! └── receipt.toml   # Record of the last install
//! ```

pub mod cmd;
pub mod ui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "cicost-install")]
#[command(author, version = env!("CICOST_INSTALL_VERSION"), about = "Verified installer for cicost")]
pub struct Cli {
    /// Release manifest to use instead of the built-in one
    #[arg(long, global = true, env = "CICOST_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Installer home (scratch space and receipt)
    #[arg(long, global = true, env = "CICOST_HOME")]
    pub home: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Platform selection shared by `install` and `resolve`.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct Target {
    /// Release version (defaults to the newest in the manifest)
    #[arg(long)]
    pub version: Option<String>,
    /// Target OS: macos or linux (defaults to this host)
    #[arg(long)]
    pub os: Option<String>,
    /// Target architecture: arm64 or amd64 (defaults to this host)
    #[arg(long)]
    pub arch: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download, verify and install cicost
    Install {
        #[command(flatten)]
        target: Target,
        /// Install directory
        #[arg(long, env = "CICOST_BIN_DIR")]
        bin_dir: Option<PathBuf>,
        /// Download timeout in seconds
        #[arg(long, env = "CICOST_FETCH_TIMEOUT", value_parser = clap::value_parser!(u64).range(1..))]
        timeout: Option<u64>,
        /// Install from a local copy of the release archive
        #[arg(long, value_name = "FILE")]
        archive: Option<PathBuf>,
        /// Do not run `cicost version` after installing
        #[arg(long)]
        skip_smoke_test: bool,
        /// Show what would be installed without making changes
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the release that would be installed
    Resolve {
        #[command(flatten)]
        target: Target,
        /// List every release in the manifest instead
        #[arg(long, conflicts_with_all = ["version", "os", "arch"])]
        all: bool,
    },
    /// Smoke-test an installed cicost
    Verify {
        /// Install directory
        #[arg(long, env = "CICOST_BIN_DIR")]
        bin_dir: Option<PathBuf>,
    },
    /// Show the last install
    Status,
    /// Render the Homebrew formula for a release
    Formula {
        /// Release version (defaults to the newest in the manifest)
        #[arg(long)]
        version: Option<String>,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compute SHA256 hash of a file (for manifest authoring)
    Hash {
        /// Files to hash
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
