use std::io::IsTerminal;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use indicatif::{ProgressBar, ProgressStyle};

/// Progress indicator for scans and parallel diffs.
///
/// The indicator is automatically disabled in quiet mode or when stderr is not a TTY.
#[derive(Clone)]
pub struct ScanProgress {
    progress_bar: ProgressBar,
    counter: Arc<AtomicU64>,
}

impl ScanProgress {
    /// Spinner counting scanned files when the total is not known up front.
    ///
    /// The spinner outputs to stderr to avoid interfering with stdout output.
    ///
    /// # Panics
    ///
    /// This function will panic if the template is invalid.
    /// The template is a compile-time constant, so this should never happen.
    #[must_use]
    pub fn spinner(quiet: bool) -> Self {
        let is_tty = std::io::stderr().is_terminal();
        Self::with_visibility(quiet, is_tty, || {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} Scanning {msg} ({pos} files)")
                    // SAFETY: Template is a static string with valid format specifiers
                    .expect("valid template"),
            );
            pb
        })
    }

    /// Bar over a known number of items.
    ///
    /// # Panics
    ///
    /// This function will panic if the template is invalid.
    /// The template is a compile-time constant, so this should never happen.
    #[must_use]
    pub fn bar(total: u64, quiet: bool) -> Self {
        let is_tty = std::io::stderr().is_terminal();
        Self::with_visibility(quiet, is_tty, || {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
                    // SAFETY: Template is a static string with valid format specifiers
                    .expect("valid template")
                    .progress_chars("█▓░"),
            );
            pb
        })
    }

    /// Internal constructor that allows testing the visible path even when
    /// running in non-TTY environments.
    fn with_visibility(quiet: bool, is_tty: bool, visible: impl FnOnce() -> ProgressBar) -> Self {
        let progress_bar = if quiet || !is_tty {
            ProgressBar::hidden()
        } else {
            visible()
        };

        Self {
            progress_bar,
            counter: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.progress_bar.set_message(message.into());
    }

    /// Increments the progress counter by 1.
    ///
    /// Thread-safe for use with rayon parallel iterators.
    pub fn inc(&self) {
        let count = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        self.progress_bar.set_position(count);
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    /// Finishes the indicator and clears it from the terminal.
    pub fn finish(&self) {
        self.progress_bar.finish_and_clear();
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
