//! Installer configuration.
//!
//! Values come from the environment and can be overridden field by field by
//! the caller (the CLI maps its flags onto the builder methods).
//!
//! | variable | meaning | default |
//! |---|---|---|
//! | `CICOST_HOME` | installer home | `~/.cicost` |
//! | `CICOST_BIN_DIR` | install directory | `$CICOST_HOME/bin` |
//! | `CICOST_MANIFEST` | release manifest replacing the built-in one | built-in |
//! | `CICOST_FETCH_TIMEOUT` | download timeout, seconds | `300` |

use std::path::{Path, PathBuf};
use std::time::Duration;

use cicost_schema::{ReleaseManifest, ReleaseTable};
use tracing::debug;

use crate::error::InstallError;
use crate::paths;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerConfig {
    pub home: PathBuf,
    pub bin_dir: PathBuf,
    pub manifest: Option<PathBuf>,
    pub fetch_timeout: Duration,
    pub smoke_timeout: Duration,
}

impl InstallerConfig {
    pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(300);
    pub const DEFAULT_SMOKE_TIMEOUT: Duration = Duration::from_secs(30);

    /// Defaults rooted at `home`.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            bin_dir: paths::bin_path(&home),
            home,
            manifest: None,
            fetch_timeout: Self::DEFAULT_FETCH_TIMEOUT,
            smoke_timeout: Self::DEFAULT_SMOKE_TIMEOUT,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, InstallError> {
        let home = paths::try_cicost_home().ok_or_else(|| {
            InstallError::Config("Could not determine home directory. Set CICOST_HOME.".into())
        })?;
        let mut config = Self::with_home(home);

        if let Ok(dir) = std::env::var("CICOST_BIN_DIR") {
            config.bin_dir = PathBuf::from(dir);
        }
        if let Ok(manifest) = std::env::var("CICOST_MANIFEST") {
            config.manifest = Some(PathBuf::from(manifest));
        }
        if let Ok(secs) = std::env::var("CICOST_FETCH_TIMEOUT") {
            config.fetch_timeout = parse_timeout(&secs)?;
        }

        Ok(config)
    }

    /// Move the home, keeping an explicitly chosen bin dir.
    pub fn home(mut self, home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        if self.bin_dir == paths::bin_path(&self.home) {
            self.bin_dir = paths::bin_path(&home);
        }
        self.home = home;
        self
    }

    pub fn bin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bin_dir = dir.into();
        self
    }

    pub fn manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest = Some(path.into());
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn smoke_timeout(mut self, timeout: Duration) -> Self {
        self.smoke_timeout = timeout;
        self
    }

    /// Scratch root for downloads.
    pub fn tmp_dir(&self) -> PathBuf {
        paths::tmp_path(&self.home)
    }

    /// Path of the install receipt.
    pub fn receipt_path(&self) -> PathBuf {
        paths::receipt_path(&self.home)
    }

    /// Final path of the installed executable.
    pub fn binary_path(&self) -> PathBuf {
        self.bin_dir.join(crate::BINARY_NAME)
    }

    /// Load the release table: the configured manifest if set, otherwise the
    /// built-in one. The two are never merged.
    pub fn load_table(&self) -> Result<ReleaseTable, InstallError> {
        match &self.manifest {
            Some(path) => load_manifest(path),
            None => {
                debug!("using built-in release manifest");
                Ok(ReleaseManifest::from_toml(crate::BUILTIN_MANIFEST)?.into_table()?)
            }
        }
    }
}

fn load_manifest(path: &Path) -> Result<ReleaseTable, InstallError> {
    debug!(path = %path.display(), "loading release manifest");
    let content = std::fs::read_to_string(path)
        .map_err(|e| InstallError::context("Failed to read release manifest", e))?;
    Ok(ReleaseManifest::from_toml(&content)?.into_table()?)
}

/// Parse a timeout given in whole seconds.
pub fn parse_timeout(secs: &str) -> Result<Duration, InstallError> {
    match secs.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(InstallError::Config(format!(
            "timeout must be a positive number of seconds, got '{secs}'"
        ))),
        Ok(n) => Ok(Duration::from_secs(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cicost_schema::{Arch, Os};

    #[test]
    fn defaults_follow_home() {
        let config = InstallerConfig::with_home("/opt/cicost");
        assert_eq!(config.bin_dir, PathBuf::from("/opt/cicost/bin"));
        assert_eq!(config.tmp_dir(), PathBuf::from("/opt/cicost/tmp"));
        assert_eq!(config.binary_path(), PathBuf::from("/opt/cicost/bin/cicost"));
        assert_eq!(config.fetch_timeout, InstallerConfig::DEFAULT_FETCH_TIMEOUT);
    }

    #[test]
    fn moving_home_keeps_custom_bin_dir() {
        let moved = InstallerConfig::with_home("/a").home("/b");
        assert_eq!(moved.bin_dir, PathBuf::from("/b/bin"));

        let pinned = InstallerConfig::with_home("/a").bin_dir("/usr/local/bin").home("/b");
        assert_eq!(pinned.bin_dir, PathBuf::from("/usr/local/bin"));
    }

    #[test]
    fn builtin_table_pins_linux_arm64() {
        let table = InstallerConfig::with_home("/tmp/x").load_table().unwrap();
        let v = semver::Version::new(0, 2, 0);
        let d = table.get(&v, Os::Linux, Arch::Arm64).unwrap();
        assert_eq!(
            d.url,
            "https://github.com/peter941221/CICost/releases/download/v0.2.0/cicost_0.2.0_linux_arm64.tar.gz"
        );
        assert_eq!(
            d.sha256.as_str(),
            "64efc35f40a0896199a38a385bacb2937195af44dce4c2c8b549d1b37473fa54"
        );
    }

    #[test]
    fn custom_manifest_replaces_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("releases.toml");
        std::fs::write(
            &path,
            format!(
                r#"
[[release]]
version = "0.3.0"
url_template = "https://example.com/v{{version}}/cicost_{{version}}_{{os}}_{{arch}}.tar.gz"

[[release.artifact]]
os = "macos"
arch = "arm64"
sha256 = "{}"
"#,
                "c".repeat(64)
            ),
        )
        .unwrap();

        let table = InstallerConfig::with_home(dir.path())
            .manifest(&path)
            .load_table()
            .unwrap();
        assert_eq!(table.len(), 1);
        assert!(!table.has_version(&semver::Version::new(0, 2, 0)));
    }

    #[test]
    fn missing_manifest_is_reported() {
        let err = InstallerConfig::with_home("/tmp/x")
            .manifest("/nonexistent/releases.toml")
            .load_table()
            .unwrap_err();
        assert!(err.to_string().contains("release manifest"));
    }

    #[test]
    fn timeout_must_be_positive() {
        assert_eq!(parse_timeout("45").unwrap(), Duration::from_secs(45));
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("soon").is_err());
    }
}
