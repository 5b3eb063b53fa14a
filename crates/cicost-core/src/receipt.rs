//! Record of the last successful install.

use std::io::Write;
use std::path::{Path, PathBuf};

use cicost_schema::{Arch, Os};
use serde::{Deserialize, Serialize};

use crate::artifact::VerifiedArchive;
use crate::error::InstallError;
use crate::install::InstalledBinary;

/// Written to `<home>/receipt.toml` after the binary is in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallReceipt {
    pub version: semver::Version,
    pub os: Os,
    pub arch: Arch,
    pub url: String,
    pub archive_sha256: String,
    pub binary: PathBuf,
    pub binary_sha256: String,
    /// RFC 3339 timestamp
    pub installed_at: String,
}

impl InstallReceipt {
    pub fn new(archive: &VerifiedArchive, binary: &InstalledBinary) -> Self {
        let descriptor = archive.descriptor();
        Self {
            version: descriptor.version.clone(),
            os: descriptor.os,
            arch: descriptor.arch,
            url: descriptor.url.clone(),
            archive_sha256: archive.sha256().to_string(),
            binary: binary.path.clone(),
            binary_sha256: binary.sha256.clone(),
            installed_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Load a receipt; `Ok(None)` when nothing has been installed yet.
    pub fn load(path: &Path) -> Result<Option<Self>, InstallError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(InstallError::context("Failed to read install receipt", e)),
        };
        toml::from_str(&content)
            .map(Some)
            .map_err(|e| InstallError::Receipt(e.to_string()))
    }

    /// Write the receipt atomically (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<(), InstallError> {
        let body = toml::to_string_pretty(self).map_err(|e| InstallError::Receipt(e.to_string()))?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(body.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(path)
            .map_err(|e| InstallError::context("Failed to write install receipt", e.error))?;
        Ok(())
    }

    /// Whether the recorded binary is still present with the recorded digest.
    pub fn binary_intact(&self) -> bool {
        crate::io::download::hash_file(&self.binary).is_ok_and(|h| h == self.binary_sha256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(binary: PathBuf) -> InstallReceipt {
        InstallReceipt {
            version: semver::Version::new(0, 2, 0),
            os: Os::Linux,
            arch: Arch::Arm64,
            url: "https://example.com/v0.2.0/cicost_0.2.0_linux_arm64.tar.gz".to_string(),
            archive_sha256: "a".repeat(64),
            binary,
            binary_sha256: "b".repeat(64),
            installed_at: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn missing_receipt_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(InstallReceipt::load(&dir.path().join("receipt.toml")).unwrap().is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.toml");
        let receipt = sample(dir.path().join("bin/cicost"));

        receipt.save(&path).unwrap();
        let loaded = InstallReceipt::load(&path).unwrap().unwrap();
        assert_eq!(loaded, receipt);
    }

    #[test]
    fn binary_intact_checks_digest() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("cicost");
        std::fs::write(&bin, b"v1").unwrap();

        let mut receipt = sample(bin.clone());
        receipt.binary_sha256 = crate::io::download::hash_file(&bin).unwrap();
        assert!(receipt.binary_intact());

        std::fs::write(&bin, b"v2").unwrap();
        assert!(!receipt.binary_intact());

        std::fs::remove_file(&bin).unwrap();
        assert!(!receipt.binary_intact());
    }

    #[test]
    fn garbage_receipt_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.toml");
        std::fs::write(&path, "version = 3").unwrap();
        assert!(matches!(
            InstallReceipt::load(&path),
            Err(InstallError::Receipt(_))
        ));
    }
}
