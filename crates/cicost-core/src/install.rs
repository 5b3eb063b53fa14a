//! Placing the executable into the install directory.
//!
//! The binary is first staged into a uniquely named temporary file inside the
//! destination directory, then renamed over the final path. A rename within
//! one directory is atomic, so the final path either holds the previous
//! binary or the complete new one, never a truncated file. A staged binary
//! that is dropped without [`StagedBinary::commit`] deletes itself.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::artifact::VerifiedArchive;
use crate::error::InstallError;
use crate::io::{download, extract};

/// The executable extracted into the install directory but not yet visible
/// under its final name.
#[derive(Debug)]
pub struct StagedBinary {
    temp: NamedTempFile,
    dest: PathBuf,
    size: u64,
}

/// The executable at its final path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledBinary {
    /// Final path (`<bin_dir>/cicost`)
    pub path: PathBuf,
    /// SHA256 of the executable itself (not the archive)
    pub sha256: String,
    /// Size in bytes
    pub size: u64,
}

impl StagedBinary {
    /// Where the binary will live after [`commit`](Self::commit).
    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Path of the staged temporary file.
    pub fn staged_path(&self) -> &Path {
        self.temp.path()
    }

    /// Atomically move the staged file over the destination, replacing any
    /// previous binary.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the rename fails; the staged file is removed.
    pub fn commit(self) -> Result<InstalledBinary, InstallError> {
        let Self { temp, dest, size } = self;
        temp.persist(&dest)
            .map_err(|e| InstallError::context("Failed to move binary into place", e.error))?;

        let sha256 = download::hash_file(&dest)?;
        info!(path = %dest.display(), %sha256, "installed binary");
        Ok(InstalledBinary {
            path: dest,
            sha256,
            size,
        })
    }
}

/// Extract the executable `name` from `archive` into a staged file in
/// `bin_dir` with mode `0755`.
///
/// # Errors
///
/// `MissingExecutable` if the archive has no such file, or an I/O error.
pub fn stage(
    archive: &VerifiedArchive,
    bin_dir: &Path,
    name: &str,
) -> Result<StagedBinary, InstallError> {
    // Directories this call creates, innermost first
    let created: Vec<&Path> = bin_dir
        .ancestors()
        .take_while(|dir| !dir.as_os_str().is_empty() && !dir.exists())
        .collect();
    std::fs::create_dir_all(bin_dir)
        .map_err(|e| InstallError::context("Failed to create install directory", e))?;

    stage_into(archive, bin_dir, name).inspect_err(|_| {
        for dir in &created {
            if std::fs::remove_dir(dir).is_err() {
                break;
            }
        }
    })
}

fn stage_into(
    archive: &VerifiedArchive,
    bin_dir: &Path,
    name: &str,
) -> Result<StagedBinary, InstallError> {
    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(".partial")
        .tempfile_in(bin_dir)
        .map_err(|e| InstallError::context("Failed to create staging file", e))?;

    let size = extract::extract_executable(archive.path(), name, temp.as_file_mut())?;
    temp.as_file_mut().flush()?;
    temp.as_file().sync_all()?;
    set_executable(temp.path())?;

    debug!(staged = %temp.path().display(), size, "staged executable");
    Ok(StagedBinary {
        temp,
        dest: bin_dir.join(name),
        size,
    })
}

/// Stage and commit in one step. Re-running overwrites the previous binary
/// without removing it first.
///
/// # Errors
///
/// See [`stage`] and [`StagedBinary::commit`].
pub fn install(
    archive: &VerifiedArchive,
    bin_dir: &Path,
    name: &str,
) -> Result<InstalledBinary, InstallError> {
    stage(archive, bin_dir, name)?.commit()
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<(), InstallError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| InstallError::context("Failed to mark binary executable", e))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<(), InstallError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::verify_local;
    use cicost_schema::{Arch, Os, ReleaseDescriptor, Sha256Digest};
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tempfile::TempDir;

    const SCRIPT: &[u8] = b"#!/bin/sh\necho \"cicost 0.2.0 (commit: abc, built: today)\"\n";

    struct Fixture {
        root: TempDir,
        archive: VerifiedArchive,
    }

    impl Fixture {
        fn new(entries: &[(&str, &[u8])]) -> Self {
            Self::with_url(
                entries,
                "https://example.com/v0.2.0/cicost_0.2.0_linux_arm64.tar.gz",
            )
        }

        fn with_url(entries: &[(&str, &[u8])], url: &str) -> Self {
            let root = tempfile::tempdir().unwrap();
            let source = root.path().join("cicost_0.2.0_linux_arm64.tar.gz");

            let encoder = GzEncoder::new(std::fs::File::create(&source).unwrap(), Compression::default());
            let mut builder = tar::Builder::new(encoder);
            for (path, data) in entries {
                let mut header = tar::Header::new_gnu();
                header.set_size(data.len() as u64);
                header.set_mode(0o644);
                header.set_cksum();
                builder.append_data(&mut header, path, *data).unwrap();
            }
            builder.into_inner().unwrap().finish().unwrap();

            let descriptor = ReleaseDescriptor {
                version: semver::Version::new(0, 2, 0),
                os: Os::Linux,
                arch: Arch::Arm64,
                url: url.to_string(),
                sha256: Sha256Digest::new(download::hash_file(&source).unwrap()).unwrap(),
            };
            let archive = verify_local(&source, &descriptor, &root.path().join("tmp")).unwrap();
            Self { root, archive }
        }

        fn bin_dir(&self) -> PathBuf {
            self.root.path().join("bin")
        }
    }

    fn dir_listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn installs_executable_with_exec_bit() {
        let fx = Fixture::new(&[("README.md", b"docs"), ("cicost", SCRIPT)]);
        let installed = install(&fx.archive, &fx.bin_dir(), "cicost").unwrap();

        assert_eq!(installed.path, fx.bin_dir().join("cicost"));
        assert_eq!(std::fs::read(&installed.path).unwrap(), SCRIPT);
        assert_eq!(installed.size, SCRIPT.len() as u64);
        assert_eq!(dir_listing(&fx.bin_dir()), ["cicost"]);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&installed.path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn reinstall_is_idempotent() {
        let fx = Fixture::new(&[("cicost", SCRIPT)]);
        let first = install(&fx.archive, &fx.bin_dir(), "cicost").unwrap();
        let first_bytes = std::fs::read(&first.path).unwrap();

        let second = install(&fx.archive, &fx.bin_dir(), "cicost").unwrap();
        assert_eq!(std::fs::read(&second.path).unwrap(), first_bytes);
        assert_eq!(first, second);
        assert_eq!(dir_listing(&fx.bin_dir()), ["cicost"]);
    }

    #[test]
    fn dropping_a_staged_binary_leaves_nothing_behind() {
        let fx = Fixture::new(&[("cicost", SCRIPT)]);
        let staged = stage(&fx.archive, &fx.bin_dir(), "cicost").unwrap();
        assert!(staged.staged_path().exists());
        assert!(!staged.dest().exists());

        // Interrupted between extraction and placement
        drop(staged);

        assert!(!fx.bin_dir().join("cicost").exists());
        assert!(dir_listing(&fx.bin_dir()).is_empty());
    }

    #[test]
    fn interrupted_upgrade_keeps_previous_binary() {
        let fx = Fixture::new(&[("cicost", SCRIPT)]);
        let dest = fx.bin_dir().join("cicost");
        std::fs::create_dir_all(fx.bin_dir()).unwrap();
        std::fs::write(&dest, b"previous build").unwrap();

        drop(stage(&fx.archive, &fx.bin_dir(), "cicost").unwrap());

        assert_eq!(std::fs::read(&dest).unwrap(), b"previous build");
    }

    #[test]
    fn missing_executable_writes_nothing() {
        let fx = Fixture::new(&[("README.md", b"docs")]);
        let err = install(&fx.archive, &fx.bin_dir(), "cicost").unwrap_err();

        assert!(matches!(err, InstallError::MissingExecutable { .. }));
        assert!(!fx.bin_dir().exists());
    }

    #[test]
    fn failed_stage_removes_only_directories_it_created() {
        let fx = Fixture::new(&[("README.md", b"docs")]);
        let nested = fx.root.path().join("opt/cicost/bin");
        assert!(install(&fx.archive, &nested, "cicost").is_err());
        assert!(!fx.root.path().join("opt").exists());

        std::fs::create_dir_all(fx.bin_dir()).unwrap();
        std::fs::write(fx.bin_dir().join("other-tool"), b"keep").unwrap();
        assert!(install(&fx.archive, &fx.bin_dir(), "cicost").is_err());
        assert_eq!(dir_listing(&fx.bin_dir()), ["other-tool"]);
    }

    #[test]
    fn url_with_query_string_installs() {
        let fx = Fixture::with_url(
            &[("cicost", SCRIPT)],
            "https://mirror.example/v0.2.0/cicost_0.2.0_linux_arm64.tar.gz?download=1",
        );
        assert!(fx.archive.path().ends_with("cicost_0.2.0_linux_arm64.tar.gz"));

        let installed = install(&fx.archive, &fx.bin_dir(), "cicost").unwrap();
        assert_eq!(std::fs::read(&installed.path).unwrap(), SCRIPT);
    }
}
