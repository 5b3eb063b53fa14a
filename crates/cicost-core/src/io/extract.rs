//! Archive extraction module
//!
//! Release archives carry one executable plus docs. Only the executable is
//! read out; nothing else from the archive is written to disk.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Component, Path};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unsupported archive format: {0}")]
    UnsupportedFormat(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Archive {archive} does not contain '{name}'")]
    MissingExecutable { name: String, archive: String },
}

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const TAR_MAGIC: &[u8; 5] = b"ustar";
const TAR_MAGIC_OFFSET: usize = 257;
const TAR_MAGIC_END: usize = TAR_MAGIC_OFFSET + TAR_MAGIC.len();

/// Container formats release archives are published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    TarGz,
    Tar,
}

/// Detect archive format from file extension
pub fn detect_format(path: &Path) -> Result<ArtifactFormat, ExtractError> {
    if let Some(format) = sniff_format(path)? {
        return Ok(format);
    }
    format_from_name(&path.to_string_lossy())
}

/// Identify the container from its leading bytes, if they are recognizable.
fn sniff_format(path: &Path) -> Result<Option<ArtifactFormat>, ExtractError> {
    let mut head = Vec::with_capacity(TAR_MAGIC_END);
    File::open(path)?
        .take(TAR_MAGIC_END as u64)
        .read_to_end(&mut head)?;

    if head.starts_with(&GZIP_MAGIC) {
        Ok(Some(ArtifactFormat::TarGz))
    } else if head.get(TAR_MAGIC_OFFSET..TAR_MAGIC_END) == Some(TAR_MAGIC.as_slice()) {
        Ok(Some(ArtifactFormat::Tar))
    } else {
        Ok(None)
    }
}

/// Guess the container from a file name, ignoring any URL query or fragment.
pub fn format_from_name(name: &str) -> Result<ArtifactFormat, ExtractError> {
    let name = name
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .to_lowercase();

    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        Ok(ArtifactFormat::TarGz)
    } else if name.ends_with(".tar") {
        Ok(ArtifactFormat::Tar)
    } else {
        Err(ExtractError::UnsupportedFormat(name))
    }
}

/// Copy the regular file called `name` out of the archive into `out`.
///
/// The file may sit at the archive root or inside a single top-level
/// directory (`cicost_0.2.0_linux_arm64/cicost`). Entries containing `..` or
/// absolute paths are never matched. Returns the number of bytes written.
pub fn extract_executable<W: Write>(
    archive_path: &Path,
    name: &str,
    out: &mut W,
) -> Result<u64, ExtractError> {
    let file = BufReader::new(File::open(archive_path)?);
    let archive_label = archive_path
        .file_name()
        .map_or_else(|| archive_path.display().to_string(), |n| n.to_string_lossy().into_owned());

    let written = match detect_format(archive_path)? {
        ArtifactFormat::TarGz => copy_entry(flate2::read::GzDecoder::new(file), name, out)?,
        ArtifactFormat::Tar => copy_entry(file, name, out)?,
    };

    written.ok_or(ExtractError::MissingExecutable {
        name: name.to_string(),
        archive: archive_label,
    })
}

fn copy_entry<R: Read, W: Write>(
    reader: R,
    name: &str,
    out: &mut W,
) -> Result<Option<u64>, ExtractError> {
    let mut archive = tar::Archive::new(reader);
    let entries = archive
        .entries()
        .map_err(|e| ExtractError::Archive(e.to_string()))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| ExtractError::Archive(e.to_string()))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let matched = {
            let path = entry
                .path()
                .map_err(|e| ExtractError::Archive(e.to_string()))?;
            is_executable_entry(&path, name)
        };

        if matched {
            tracing::debug!(entry = name, "extracting executable");
            let written = io::copy(&mut entry, out)?;
            out.flush()?;
            return Ok(Some(written));
        }
    }

    Ok(None)
}

fn is_executable_entry(path: &Path, name: &str) -> bool {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    matches!(parts.last(), Some(last) if *last == name) && parts.len() <= 2
}
