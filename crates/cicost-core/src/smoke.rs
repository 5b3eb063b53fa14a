//! Post-install smoke test: `cicost version` must run and name itself.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::debug;
use wait_timeout::ChildExt;

use crate::BINARY_NAME;
use crate::error::InstallError;

/// Run `<binary> version` and check that stdout or stderr contains `cicost`.
///
/// Returns the trimmed combined output on success.
///
/// # Errors
///
/// `SmokeTestFailed` if the binary cannot be executed, does not exit within
/// `timeout`, exits non-zero, or does not mention its name.
pub fn verify_install(binary: &Path, timeout: Duration) -> Result<String, InstallError> {
    let fail = |reason: String| InstallError::SmokeTestFailed {
        binary: binary.to_path_buf(),
        reason,
    };

    let mut child = Command::new(binary)
        .arg("version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| fail(format!("could not execute: {e}")))?;

    // Drain both pipes while waiting so a chatty child never blocks on write
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let Some(status) = child
        .wait_timeout(timeout)
        .map_err(|e| fail(format!("wait failed: {e}")))?
    else {
        child.kill().ok();
        child.wait().ok();
        // readers are left detached: a grandchild may still hold the pipes
        return Err(fail(format!("no exit within {}s", timeout.as_secs())));
    };

    let mut combined = String::new();
    for reader in [stdout, stderr].into_iter().flatten() {
        combined.push_str(&reader.join().unwrap_or_default());
    }
    let combined = combined.trim().to_string();
    debug!(%status, output = %combined, "smoke test finished");

    if !status.success() {
        return Err(fail(format!("`version` exited with {status}")));
    }
    if !combined.contains(BINARY_NAME) {
        return Err(fail(format!(
            "output does not mention '{BINARY_NAME}': {combined:?}"
        )));
    }

    Ok(combined)
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf).ok();
        String::from_utf8_lossy(&buf).into_owned()
    })
}
