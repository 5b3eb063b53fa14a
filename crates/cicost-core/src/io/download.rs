//! Async download with streaming SHA256 verification.
//!
//! The archive is written to disk and hashed in the same pass. The digest is
//! compared with the pinned value before the caller sees the file; on any
//! failure the partial file is removed.

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use cicost_schema::Sha256Digest;
use futures::StreamExt;
use reqwest::Client;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::Reporter;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} fetching {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Timed out after {secs}s fetching {url}")]
    Timeout { url: String, secs: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
}

/// Download `url` to `dest`, failing closed on network errors, on `timeout`
/// and on a digest that differs from `expected`.
///
/// Returns the hex digest of the downloaded bytes.
pub async fn download_and_verify<R: Reporter + ?Sized>(
    client: &Client,
    url: &str,
    dest: &Path,
    expected: &Sha256Digest,
    timeout: Duration,
    reporter: &R,
) -> Result<String, DownloadError> {
    let secs = timeout.as_secs();

    let fetched = tokio::time::timeout(timeout, stream_to_file(client, url, dest, secs, reporter))
        .await
        .unwrap_or_else(|_| {
            Err(DownloadError::Timeout {
                url: url.to_string(),
                secs,
            })
        });

    let actual_hash = match fetched {
        Ok(hash) => hash,
        Err(e) => {
            tokio::fs::remove_file(dest).await.ok();
            return Err(e);
        }
    };

    if !expected.matches(&actual_hash) {
        tokio::fs::remove_file(dest).await.ok();
        return Err(DownloadError::HashMismatch {
            expected: expected.to_string(),
            actual: actual_hash,
        });
    }

    Ok(actual_hash)
}

async fn stream_to_file<R: Reporter + ?Sized>(
    client: &Client,
    url: &str,
    dest: &Path,
    secs: u64,
    reporter: &R,
) -> Result<String, DownloadError> {
    let http_error = |source: reqwest::Error| {
        if source.is_timeout() {
            DownloadError::Timeout {
                url: url.to_string(),
                secs,
            }
        } else {
            DownloadError::Http {
                url: url.to_string(),
                source,
            }
        }
    };

    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
        .send()
        .await
        .map_err(http_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::Status {
            url: url.to_string(),
            status,
        });
    }

    let total_size = response.content_length();
    reporter.downloading(0, total_size);

    let mut file = File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut hasher = Sha256::new();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(http_error)?;
        file.write_all(&chunk).await?;
        hasher.update(&chunk);
        downloaded += chunk.len() as u64;
        reporter.downloading(downloaded, total_size);
    }

    file.flush().await?;
    file.sync_all().await?;
    Ok(hex::encode(hasher.finalize()))
}

/// Compute the SHA256 of a file on disk.
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    let mut file = std::fs::File::open(path)?;
    let mut buffer = [0u8; 8192];
    loop {
        let count = file.read(&mut buffer)?;
        if count == 0 {
            break;
        }
        hasher.update(&buffer[..count]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Verify a file already on disk against a pinned digest.
pub fn verify_file(path: &Path, expected: &Sha256Digest) -> Result<String, DownloadError> {
    let actual = hash_file(path)?;
    if expected.matches(&actual) {
        Ok(actual)
    } else {
        Err(DownloadError::HashMismatch {
            expected: expected.to_string(),
            actual,
        })
    }
}
