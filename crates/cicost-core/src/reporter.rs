//! Reporter trait for dependency injection
//!
//! This trait allows the install pipeline to report progress and status
//! without being coupled to a specific terminal implementation.

use std::path::Path;

use cicost_schema::ReleaseDescriptor;

pub trait Reporter: Send + Sync {
    /// Indicates a new phase has started (e.g. "Fetching", "Installing").
    fn section(&self, title: &str);

    /// The descriptor chosen for this run.
    fn resolved(&self, descriptor: &ReleaseDescriptor);

    /// Updates the progress of a download.
    fn downloading(&self, current: u64, total: Option<u64>);

    /// The archive digest matched its pin.
    fn verified(&self, sha256: &str);

    /// The binary is about to be placed at `dest`.
    fn installing(&self, dest: &Path);

    /// Marks the run as successfully completed.
    fn done(&self, detail: &str);

    /// Marks the run as failed with a specific reason.
    fn failed(&self, reason: &str);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn section(&self, title: &str) {
        (**self).section(title);
    }
    fn resolved(&self, descriptor: &ReleaseDescriptor) {
        (**self).resolved(descriptor);
    }
    fn downloading(&self, current: u64, total: Option<u64>) {
        (**self).downloading(current, total);
    }
    fn verified(&self, sha256: &str) {
        (**self).verified(sha256);
    }
    fn installing(&self, dest: &Path) {
        (**self).installing(dest);
    }
    fn done(&self, detail: &str) {
        (**self).done(detail);
    }
    fn failed(&self, reason: &str) {
        (**self).failed(reason);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
}

/// A no-op reporter for silent operations (e.g., verification, testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _: &str) {}
    fn resolved(&self, _: &ReleaseDescriptor) {}
    fn downloading(&self, _: u64, _: Option<u64>) {}
    fn verified(&self, _: &str) {}
    fn installing(&self, _: &Path) {}
    fn done(&self, _: &str) {}
    fn failed(&self, _: &str) {}
    fn info(&self, _: &str) {}
    fn warning(&self, _: &str) {}
}
