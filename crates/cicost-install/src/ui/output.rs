//! Console implementation of the core `Reporter`.
//!
//! Everything goes to stderr so stdout stays clean for the data a command
//! prints (`resolve`, `formula`, `hash`).

use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use cicost_core::Reporter;
use cicost_schema::ReleaseDescriptor;
use crossterm::style::Stylize;

use super::theme::{Theme, format_size, short_digest};

const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub struct ConsoleReporter {
    theme: Theme,
    quiet: bool,
    last_progress: Mutex<Option<Instant>>,
}

impl ConsoleReporter {
    pub fn new(quiet: bool) -> Self {
        Self {
            theme: Theme::default(),
            quiet,
            last_progress: Mutex::new(None),
        }
    }

    fn line(&self, text: &str) {
        if self.quiet {
            return;
        }
        self.end_progress();
        eprintln!("{text}");
    }

    /// Terminate an in-place progress line, if one is showing.
    fn end_progress(&self) {
        if self
            .last_progress
            .lock()
            .is_ok_and(|mut last| last.take().is_some())
        {
            eprintln!();
        }
    }
}

impl Reporter for ConsoleReporter {
    fn section(&self, title: &str) {
        self.line(&format!("{}", title.dark_grey()));
    }

    fn resolved(&self, descriptor: &ReleaseDescriptor) {
        let c = &self.theme.colors;
        self.line(&format!(
            "   {} {} {}",
            format!("cicost {}", descriptor.version).with(c.primary),
            format!("{}/{}", descriptor.os, descriptor.arch).with(c.secondary),
            short_digest(descriptor.sha256.as_str()).with(c.secondary),
        ));
    }

    fn downloading(&self, current: u64, total: Option<u64>) {
        if self.quiet {
            return;
        }
        let Ok(mut last) = self.last_progress.lock() else {
            return;
        };
        let finished = total.is_some_and(|t| current >= t);
        if !finished && last.is_some_and(|t| t.elapsed() < PROGRESS_INTERVAL) {
            return;
        }
        *last = Some(Instant::now());

        let status = match total.filter(|&t| t > 0) {
            Some(t) => format!("{} / {}", format_size(current), format_size(t)),
            None => format_size(current),
        };
        let mut err = std::io::stderr();
        let _ = write!(
            err,
            "\r   {} {}",
            self.theme.icons.active.with(self.theme.colors.warning),
            status.with(self.theme.colors.secondary)
        );
        let _ = err.flush();
    }

    fn verified(&self, sha256: &str) {
        self.line(&format!(
            "   {} sha256 {}",
            self.theme.icons.success.with(self.theme.colors.success),
            short_digest(sha256).with(self.theme.colors.secondary)
        ));
    }

    fn installing(&self, dest: &Path) {
        self.line(&format!(
            "   {} {}",
            self.theme.icons.active.with(self.theme.colors.warning),
            dest.display()
        ));
    }

    fn done(&self, detail: &str) {
        self.line(&format!(
            "{} {}",
            self.theme.icons.success.with(self.theme.colors.success),
            detail
        ));
    }

    fn failed(&self, _reason: &str) {
        // the error itself is printed by main
        self.end_progress();
    }

    fn info(&self, msg: &str) {
        self.line(&format!(
            "{} {msg}",
            self.theme.icons.info.with(self.theme.colors.secondary)
        ));
    }

    fn warning(&self, msg: &str) {
        // warnings survive --quiet
        self.end_progress();
        eprintln!(
            "{} {}",
            self.theme.icons.warning.with(self.theme.colors.warning),
            msg.with(self.theme.colors.warning)
        );
    }
}
