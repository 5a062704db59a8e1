use std::fmt::Write;

use crate::error::Result;
use crate::gate::GateReport;

use super::OutputFormatter;

/// Name of the synthetic test suite.
pub const JUNIT_SUITE: &str = "eh-metrics";

/// JUnit XML with one test case per metric.
pub struct JUnitFormatter;

impl OutputFormatter for JUnitFormatter {
    fn format(&self, report: &GateReport) -> Result<String> {
        let failures = report.regressions().count();
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let _ = writeln!(
            xml,
            "<testsuite name=\"{JUNIT_SUITE}\" tests=\"{}\" failures=\"{failures}\" errors=\"0\" skipped=\"0\">",
            report.checks.len()
        );
        for check in &report.checks {
            let name = xml_escape(&check.key);
            if check.is_failure() {
                let message = xml_escape(&check.message);
                let _ = writeln!(
                    xml,
                    "  <testcase classname=\"{JUNIT_SUITE}\" name=\"{name}\">\n    <failure message=\"{message}\">{message}</failure>\n  </testcase>"
                );
            } else {
                let _ = writeln!(xml, "  <testcase classname=\"{JUNIT_SUITE}\" name=\"{name}\"/>");
            }
        }
        xml.push_str("</testsuite>\n");
        Ok(xml)
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
#[path = "junit_tests.rs"]
mod tests;
