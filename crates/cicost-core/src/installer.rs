//! The install pipeline as one object.
//!
//! [`Installer`] owns the release table, the HTTP client and a reporter, and
//! drives the stages in order. Each stage is also exposed on its own so the
//! CLI can stop early (`resolve`, `--dry-run`) or start late (`verify`).

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use cicost_schema::{ReleaseDescriptor, ReleaseTable};
use reqwest::Client;
use tracing::{info, instrument, warn};

use crate::artifact::{self, VerifiedArchive};
use crate::config::InstallerConfig;
use crate::error::InstallError;
use crate::install::{self, InstalledBinary};
use crate::receipt::InstallReceipt;
use crate::reporter::Reporter;
use crate::resolver::{self, Platform};
use crate::{BINARY_NAME, USER_AGENT, smoke, sweep};

/// What the caller asked for. `None` fields default to the latest version
/// and the running host.
#[derive(Debug, Clone, Default)]
pub struct InstallRequest {
    pub version: Option<String>,
    pub os: Option<String>,
    pub arch: Option<String>,
    /// Install from this local archive instead of downloading it.
    pub archive: Option<PathBuf>,
    pub skip_smoke_test: bool,
}

/// A resolved platform and the table row it selected.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub platform: Platform,
    pub descriptor: ReleaseDescriptor,
}

/// Result of a completed [`Installer::run`].
#[derive(Debug)]
pub struct InstallOutcome {
    pub descriptor: ReleaseDescriptor,
    pub binary: InstalledBinary,
    /// `cicost version` output; `None` when the smoke test was skipped.
    pub smoke_output: Option<String>,
    pub receipt_path: PathBuf,
}

pub struct Installer<R: Reporter> {
    config: InstallerConfig,
    table: ReleaseTable,
    client: Client,
    reporter: R,
}

impl<R: Reporter> Installer<R> {
    /// Build an installer, loading the release table named by `config`.
    pub fn new(config: InstallerConfig, reporter: R) -> Result<Self, InstallError> {
        let table = config.load_table()?;
        Self::with_table(config, table, reporter)
    }

    /// Build an installer over an explicit table.
    pub fn with_table(
        config: InstallerConfig,
        table: ReleaseTable,
        reporter: R,
    ) -> Result<Self, InstallError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| InstallError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            config,
            table,
            client,
            reporter,
        })
    }

    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    pub fn table(&self) -> &ReleaseTable {
        &self.table
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Pick the descriptor for a request without touching the network.
    pub fn resolve(&self, request: &InstallRequest) -> Result<Resolution, InstallError> {
        let platform = Platform::detect(request.os.as_deref(), request.arch.as_deref())?;
        let version = resolver::pick_version(&self.table, request.version.as_deref())?;
        let descriptor =
            resolver::resolve_descriptor(&self.table, &version, platform.os, platform.arch)?
                .clone();
        Ok(Resolution {
            platform,
            descriptor,
        })
    }

    /// Download and verify the archive for `descriptor`.
    pub async fn fetch(
        &self,
        descriptor: &ReleaseDescriptor,
    ) -> Result<VerifiedArchive, InstallError> {
        artifact::fetch_and_verify(
            &self.client,
            descriptor,
            &self.config.tmp_dir(),
            self.config.fetch_timeout,
            &self.reporter,
        )
        .await
    }

    /// Verify a local archive against `descriptor`.
    pub async fn verify_archive(
        &self,
        source: &Path,
        descriptor: &ReleaseDescriptor,
    ) -> Result<VerifiedArchive, InstallError> {
        let source = source.to_path_buf();
        let descriptor = descriptor.clone();
        let tmp_root = self.config.tmp_dir();
        tokio::task::spawn_blocking(move || artifact::verify_local(&source, &descriptor, &tmp_root))
            .await
            .map_err(join_error)?
    }

    /// Extract and atomically place the binary. Returns the archive back so
    /// its scratch directory lives until the caller is done with it.
    pub async fn install(
        &self,
        archive: VerifiedArchive,
    ) -> Result<(VerifiedArchive, InstalledBinary), InstallError> {
        let bin_dir = self.config.bin_dir.clone();
        tokio::task::spawn_blocking(move || {
            let installed = install::install(&archive, &bin_dir, BINARY_NAME)?;
            Ok((archive, installed))
        })
        .await
        .map_err(join_error)?
    }

    /// Smoke-test an installed binary.
    pub async fn verify(&self, binary: &Path) -> Result<String, InstallError> {
        let binary = binary.to_path_buf();
        let timeout = self.config.smoke_timeout;
        tokio::task::spawn_blocking(move || smoke::verify_install(&binary, timeout))
            .await
            .map_err(join_error)?
    }

    /// Run the whole pipeline.
    #[instrument(skip_all)]
    pub async fn run(&self, request: &InstallRequest) -> Result<InstallOutcome, InstallError> {
        let result = self.run_inner(request).await;
        if let Err(e) = &result {
            self.reporter.failed(&e.to_string());
        }
        result
    }

    async fn run_inner(&self, request: &InstallRequest) -> Result<InstallOutcome, InstallError> {
        if let Some(cutoff) = SystemTime::now().checked_sub(sweep::STALE_AFTER) {
            sweep::sweep_stale(&self.config.tmp_dir(), &self.config.bin_dir, cutoff);
        }

        self.reporter.section("Resolving");
        let Resolution {
            platform,
            descriptor,
        } = self.resolve(request)?;
        if let Some(requested) = &platform.arch_fallback {
            self.reporter.warning(&format!(
                "unrecognized architecture '{requested}', using the {} release",
                platform.arch
            ));
        }
        self.reporter.resolved(&descriptor);

        let archive = match &request.archive {
            Some(source) => {
                self.reporter.section("Verifying");
                self.verify_archive(source, &descriptor).await?
            }
            None => {
                self.reporter.section("Fetching");
                self.fetch(&descriptor).await?
            }
        };
        self.reporter.verified(archive.sha256());

        self.reporter.section("Installing");
        self.reporter.installing(&self.config.binary_path());
        let (archive, binary) = self.install(archive).await?;

        let receipt_path = self.config.receipt_path();
        InstallReceipt::new(&archive, &binary).save(&receipt_path)?;
        drop(archive);

        let smoke_output = if request.skip_smoke_test {
            warn!("smoke test skipped");
            None
        } else {
            self.reporter.section("Verifying install");
            Some(self.verify(&binary.path).await?)
        };

        info!(
            version = %descriptor.version,
            path = %binary.path.display(),
            "install complete"
        );
        self.reporter
            .done(&format!("cicost {} -> {}", descriptor.version, binary.path.display()));

        Ok(InstallOutcome {
            descriptor,
            binary,
            smoke_output,
            receipt_path,
        })
    }
}

fn join_error(e: tokio::task::JoinError) -> InstallError {
    InstallError::Io(std::io::Error::other(e))
}
