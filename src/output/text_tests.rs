use super::*;

fn check(key: &str, status: CheckStatus, message: &str) -> MetricCheck {
    MetricCheck {
        key: key.to_string(),
        status,
        value: 1,
        baseline: Some(1),
        message: message.to_string(),
    }
}

fn report() -> GateReport {
    GateReport {
        baseline_commit: Some("abc123".to_string()),
        baseline_build: Some("41".to_string()),
        checks: vec![
            check("a", CheckStatus::Passed, "a unchanged at 1"),
            check("b", CheckStatus::Regressed, "b increased from 1 to 2"),
            check("c", CheckStatus::Improved, "c decreased from 3 to 1"),
        ],
        missing: Vec::new(),
    }
}

#[test]
fn lists_only_interesting_checks_by_default() {
    let output = TextFormatter::new(ColorMode::Never).format(&report()).unwrap();

    assert!(output.contains("Baseline: abc123 (build 41)"));
    assert!(output.contains("✗ FAILED: b increased from 1 to 2"));
    assert!(output.contains("↗ IMPROVED: c decreased from 3 to 1"));
    assert!(!output.contains("a unchanged"));
    assert!(output.contains("Summary: 3 metrics, 1 improved, 1 failed"));
}

#[test]
fn verbose_lists_passing_checks() {
    let output = TextFormatter::with_verbose(ColorMode::Never, 1)
        .format(&report())
        .unwrap();
    assert!(output.contains("✓ PASSED: a unchanged at 1"));
}

#[test]
fn colors_wrap_status() {
    let output = TextFormatter::new(ColorMode::Always).format(&report()).unwrap();
    assert!(output.contains("\x1b[31mFAILED\x1b[0m"));
}

#[test]
fn bootstrap_header() {
    let report = GateReport {
        baseline_commit: None,
        baseline_build: None,
        checks: Vec::new(),
        missing: Vec::new(),
    };
    let output = TextFormatter::new(ColorMode::Never).format(&report).unwrap();
    assert!(output.starts_with("No baseline"));
}
