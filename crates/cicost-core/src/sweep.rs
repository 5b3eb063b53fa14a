//! Removal of leftovers from runs that were killed mid-install.
//!
//! Scratch directories and staged binaries normally delete themselves on
//! drop. A run that dies from SIGKILL or power loss never gets that far, so
//! each install starts by removing such entries once they are old enough
//! that no live run can still own them.

use std::path::Path;
use std::time::{Duration, SystemTime};

use tracing::{debug, warn};

use crate::BINARY_NAME;

/// Entries younger than this may belong to a concurrent run.
pub const STALE_AFTER: Duration = Duration::from_secs(60 * 60);

/// Remove `cicost-*` scratch directories under `tmp_root` and
/// `.cicost.*.partial` files in `bin_dir` last modified before `cutoff`.
///
/// Best effort: unreadable directories and failed removals are logged and
/// skipped. Returns the number of entries removed.
pub fn sweep_stale(tmp_root: &Path, bin_dir: &Path, cutoff: SystemTime) -> usize {
    let scratch_prefix = format!("{BINARY_NAME}-");
    let staged_prefix = format!(".{BINARY_NAME}.");

    let scratch = sweep_dir(tmp_root, cutoff, |name, is_dir| {
        is_dir && name.starts_with(&scratch_prefix)
    });
    let staged = sweep_dir(bin_dir, cutoff, |name, is_dir| {
        !is_dir && name.starts_with(&staged_prefix) && name.ends_with(".partial")
    });
    scratch + staged
}

fn sweep_dir(dir: &Path, cutoff: SystemTime, matches: impl Fn(&str, bool) -> bool) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        let name = entry.file_name();
        if !matches(&name.to_string_lossy(), meta.is_dir()) {
            continue;
        }
        if meta.modified().is_ok_and(|m| m >= cutoff) {
            continue;
        }

        let path = entry.path();
        let result = if meta.is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        match result {
            Ok(()) => {
                debug!(path = %path.display(), "removed stale leftover");
                removed += 1;
            }
            Err(e) => warn!(path = %path.display(), error = %e, "could not remove stale leftover"),
        }
    }
    removed
}
