//! Fetch-and-verify stage.
//!
//! A [`VerifiedArchive`] is the only way to reach the install stage, and one
//! can only be built by checking the archive bytes against the pinned
//! digest. The scratch directory holding the archive is unique per run and
//! is removed when the value is dropped, whichever way the run ends.

use std::path::{Path, PathBuf};
use std::time::Duration;

use cicost_schema::ReleaseDescriptor;
use reqwest::Client;
use tempfile::TempDir;
use tracing::{debug, instrument};

use crate::error::InstallError;
use crate::io::download;
use crate::paths::filename_from_url;
use crate::reporter::Reporter;

/// An archive whose SHA256 matched its descriptor.
#[derive(Debug)]
pub struct VerifiedArchive {
    scratch: TempDir,
    path: PathBuf,
    descriptor: ReleaseDescriptor,
    sha256: String,
}

impl VerifiedArchive {
    /// Path of the archive inside the scratch directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Descriptor the archive was verified against.
    pub fn descriptor(&self) -> &ReleaseDescriptor {
        &self.descriptor
    }

    /// Hex digest of the archive bytes.
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    /// Scratch directory that is removed on drop.
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }
}

/// Create a uniquely named scratch directory under `tmp_root`.
fn scratch_dir(tmp_root: &Path) -> Result<TempDir, InstallError> {
    std::fs::create_dir_all(tmp_root)
        .map_err(|e| InstallError::context("Failed to create temp root", e))?;
    tempfile::Builder::new()
        .prefix("cicost-")
        .tempdir_in(tmp_root)
        .map_err(|e| InstallError::context("Failed to create scratch directory", e))
}

fn archive_file_name(descriptor: &ReleaseDescriptor) -> String {
    match filename_from_url(&descriptor.url) {
        "" => format!("{}.tar.gz", cicost_schema::BINARY_NAME),
        name => name.to_string(),
    }
}

/// Download the archive named by `descriptor` and check its digest.
///
/// # Errors
///
/// `NetworkError`, `FetchTimeout` or `ChecksumMismatch`; the scratch
/// directory is gone by the time the error is returned.
#[instrument(skip_all, fields(url = %descriptor.url))]
pub async fn fetch_and_verify<R: Reporter + ?Sized>(
    client: &Client,
    descriptor: &ReleaseDescriptor,
    tmp_root: &Path,
    timeout: Duration,
    reporter: &R,
) -> Result<VerifiedArchive, InstallError> {
    let scratch = scratch_dir(tmp_root)?;
    let path = scratch.path().join(archive_file_name(descriptor));
    debug!(dest = %path.display(), "downloading archive");

    let sha256 = download::download_and_verify(
        client,
        &descriptor.url,
        &path,
        &descriptor.sha256,
        timeout,
        reporter,
    )
    .await?;

    debug!(%sha256, "archive digest matches pin");
    Ok(VerifiedArchive {
        scratch,
        path,
        descriptor: descriptor.clone(),
        sha256,
    })
}

/// Verify an archive that is already on disk (offline install).
///
/// The file is copied into a fresh scratch directory first, so the caller's
/// copy is never modified and the digest covers exactly the bytes that get
/// extracted.
///
/// # Errors
///
/// `ChecksumMismatch` if the digest differs, or an I/O error.
pub fn verify_local(
    source: &Path,
    descriptor: &ReleaseDescriptor,
    tmp_root: &Path,
) -> Result<VerifiedArchive, InstallError> {
    let scratch = scratch_dir(tmp_root)?;
    let path = scratch.path().join(archive_file_name(descriptor));
    std::fs::copy(source, &path)
        .map_err(|e| InstallError::context("Failed to read local archive", e))?;

    let sha256 = download::verify_file(&path, &descriptor.sha256)?;
    debug!(%sha256, source = %source.display(), "local archive digest matches pin");

    Ok(VerifiedArchive {
        scratch,
        path,
        descriptor: descriptor.clone(),
        sha256,
    })
}
