//! Hash command

use std::path::PathBuf;

use anyhow::{Context, Result};
use cicost_core::io::download::hash_file;

/// Print the SHA256 of each file in `sha256sum` format.
pub fn hash(files: &[PathBuf]) -> Result<()> {
    for file in files {
        let hash = hash_file(file).with_context(|| format!("Failed to hash {}", file.display()))?;
        println!("{hash}  {}", file.display());
    }
    Ok(())
}
