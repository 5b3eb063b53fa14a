use dirs::home_dir;
use std::path::{Path, PathBuf};

/// Returns the installer home, or None if the user's home cannot be resolved.
pub fn try_cicost_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("CICOST_HOME") {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".cicost"))
}

/// Binary installation target inside a home: `<home>/bin`
pub fn bin_path(home: &Path) -> PathBuf {
    home.join("bin")
}

/// Scratch space for downloads: `<home>/tmp`
pub fn tmp_path(home: &Path) -> PathBuf {
    home.join("tmp")
}

/// Last successful install: `<home>/receipt.toml`
pub fn receipt_path(home: &Path) -> PathBuf {
    home.join("receipt.toml")
}

/// Extract the filename from a URL, without query string or fragment.
pub fn filename_from_url(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or("");
    path.split('/').next_back().unwrap_or("")
}
