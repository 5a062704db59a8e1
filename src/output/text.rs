use std::fmt::Write;

use crate::error::Result;
use crate::gate::{CheckStatus, GateReport, MetricCheck};

use super::OutputFormatter;

/// Color output mode for terminal display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Auto-detect: use colors if stdout is a TTY and `NO_COLOR` is not set
    #[default]
    Auto,
    Always,
    Never,
}

/// ANSI color codes
mod ansi {
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const CYAN: &str = "\x1b[36m";
    pub const RESET: &str = "\x1b[0m";
}

/// Human-readable gate summary.
pub struct TextFormatter {
    use_colors: bool,
    verbose: u8,
}

impl TextFormatter {
    #[must_use]
    pub fn new(mode: ColorMode) -> Self {
        Self::with_verbose(mode, 0)
    }

    /// With `verbose > 0` passing metrics are listed too.
    #[must_use]
    pub fn with_verbose(mode: ColorMode, verbose: u8) -> Self {
        Self {
            use_colors: Self::should_use_colors(mode),
            verbose,
        }
    }

    fn should_use_colors(mode: ColorMode) -> bool {
        match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                if std::env::var("NO_COLOR").is_ok() {
                    return false;
                }
                std::io::IsTerminal::is_terminal(&std::io::stdout())
            }
        }
    }

    const fn status_icon(status: CheckStatus) -> &'static str {
        match status {
            CheckStatus::Passed => "✓",
            CheckStatus::Improved => "↗",
            CheckStatus::New => "+",
            CheckStatus::Regressed => "✗",
        }
    }

    fn colorize(&self, text: &str, status: CheckStatus) -> String {
        if !self.use_colors {
            return text.to_string();
        }
        let color = match status {
            CheckStatus::Passed | CheckStatus::Improved => ansi::GREEN,
            CheckStatus::New => ansi::CYAN,
            CheckStatus::Regressed => ansi::RED,
        };
        format!("{color}{text}{}", ansi::RESET)
    }

    fn format_check(&self, check: &MetricCheck, output: &mut String) {
        let label = match check.status {
            CheckStatus::Passed => "PASSED",
            CheckStatus::Improved => "IMPROVED",
            CheckStatus::New => "NEW",
            CheckStatus::Regressed => "FAILED",
        };
        let _ = writeln!(
            output,
            "{} {}: {}",
            Self::status_icon(check.status),
            self.colorize(label, check.status),
            check.message
        );
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &GateReport) -> Result<String> {
        let mut output = String::new();
        match (&report.baseline_commit, &report.baseline_build) {
            (Some(commit), Some(build)) => {
                let _ = writeln!(output, "Baseline: {commit} (build {build})\n");
            }
            _ => output.push_str("No baseline: every metric passes.\n\n"),
        }

        for check in &report.checks {
            if self.verbose > 0 || check.status != CheckStatus::Passed {
                self.format_check(check, &mut output);
            }
        }

        let failed = report.regressions().count();
        let improved = report
            .checks
            .iter()
            .filter(|c| c.status == CheckStatus::Improved)
            .count();
        let _ = writeln!(
            output,
            "\nSummary: {} metrics, {} improved, {failed} failed",
            report.checks.len(),
            improved
        );
        Ok(output)
    }
}

#[cfg(test)]
#[path = "text_tests.rs"]
mod tests;
