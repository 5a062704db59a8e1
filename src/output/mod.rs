mod junit;
mod progress;
mod report;
mod text;

pub use junit::{JUNIT_SUITE, JUnitFormatter};
pub use progress::ScanProgress;
pub use report::{DEFAULT_MAX_POINTS, ReportData, ReportPoint, ReportValue, build_report};
pub use text::{ColorMode, TextFormatter};

use crate::error::Result;
use crate::gate::GateReport;

/// Trait for rendering a gate report.
pub trait OutputFormatter {
    /// Format the gate report into a string.
    ///
    /// # Errors
    /// Returns an error if the formatting fails.
    fn format(&self, report: &GateReport) -> Result<String>;
}
