use std::collections::VecDeque;

use tempfile::TempDir;

use super::*;
use crate::gate::{Baseline, evaluate};
use crate::ledger::memory::MemoryLedger;
use crate::snapshot::{Direction, MetricResult, Snapshot};

struct Scripted {
    answers: VecDeque<&'static str>,
    asked: usize,
}

impl Scripted {
    fn new(answers: &[&'static str]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            asked: 0,
        }
    }
}

impl Prompter for Scripted {
    fn ask(&mut self, _question: &str) -> Result<Option<String>> {
        self.asked += 1;
        Ok(self.answers.pop_front().map(str::to_string))
    }
}

fn refs() -> NoteRefs {
    NoteRefs {
        snapshots: "eh-metrics".to_string(),
        exclusions: "eh-metrics-exclusions".to_string(),
    }
}

fn snapshot(value: i64) -> Snapshot {
    let mut snapshot = Snapshot::new();
    snapshot.insert(
        "jira.stats.usageof.CacheBuilder",
        MetricResult::new(value, "usages", true, Direction::Falling),
    );
    snapshot
}

fn failing_report() -> GateReport {
    let base = Baseline {
        commit: "c1".to_string(),
        snapshot: snapshot(2).with_build_number(Some("7".to_string())),
        raised: Vec::new(),
    };
    evaluate(&snapshot(3), Some(&base), false)
}

#[test]
fn non_interactive_failure_writes_marker() {
    let tmp = TempDir::new().unwrap();
    let marker = tmp.path().join("state").join("failure-marker");
    let ledger = MemoryLedger::with_history(&["c1", "c2"]);
    let refs = refs();
    let ctx = ResolveContext {
        ledger: &ledger,
        refs: &refs,
        failure_marker: &marker,
    };

    let outcome = resolve(&failing_report(), &ctx, None).unwrap();

    assert!(!outcome.is_success());
    assert_eq!(
        fs::read_to_string(&marker).unwrap(),
        "c1:jira.stats.usageof.CacheBuilder:7"
    );
}

#[test]
fn passing_report_clears_stale_marker() {
    let tmp = TempDir::new().unwrap();
    let marker = tmp.path().join("failure-marker");
    fs::write(&marker, "old").unwrap();
    let ledger = MemoryLedger::with_history(&["c1"]);
    let refs = refs();
    let ctx = ResolveContext {
        ledger: &ledger,
        refs: &refs,
        failure_marker: &marker,
    };

    let outcome = resolve(&evaluate(&snapshot(1), None, false), &ctx, None).unwrap();

    assert_eq!(outcome, GateOutcome::Passed);
    assert!(!marker.exists());
}

#[test]
fn dirty_workspace_asks_to_commit_first() {
    let tmp = TempDir::new().unwrap();
    let marker = tmp.path().join("failure-marker");
    let mut ledger = MemoryLedger::with_history(&["c1", "c2"]);
    ledger.dirty = true;
    let refs = refs();
    let ctx = ResolveContext {
        ledger: &ledger,
        refs: &refs,
        failure_marker: &marker,
    };
    let mut prompter = Scripted::new(&["y", "reason"]);

    let outcome = resolve(&failing_report(), &ctx, Some(&mut prompter)).unwrap();

    let GateOutcome::Failed { message } = outcome else {
        panic!("expected failure");
    };
    assert!(message.contains("Commit first"));
    assert_eq!(prompter.asked, 0);
}

#[test]
fn accepted_regression_records_signed_exclusion() {
    let tmp = TempDir::new().unwrap();
    let marker = tmp.path().join("failure-marker");
    let ledger = MemoryLedger::with_history(&["c1", "c2"]);
    let refs = refs();
    let ctx = ResolveContext {
        ledger: &ledger,
        refs: &refs,
        failure_marker: &marker,
    };
    let mut prompter = Scripted::new(&["YES", "", "  ", "Vendored library migration"]);

    let outcome = resolve(&failing_report(), &ctx, Some(&mut prompter)).unwrap();

    assert_eq!(
        outcome,
        GateOutcome::Accepted {
            commit: "c2".to_string()
        }
    );
    let stored = Exclusion::from_json(&ledger.note("eh-metrics-exclusions", "c2").unwrap()).unwrap();
    assert_eq!(
        stored,
        Exclusion::new("Dev <dev@example.com>", "Vendored library migration")
            .with_value("jira.stats.usageof.CacheBuilder", 3)
    );
}

#[test]
fn three_empty_justifications_cancel() {
    let tmp = TempDir::new().unwrap();
    let marker = tmp.path().join("failure-marker");
    let ledger = MemoryLedger::with_history(&["c1", "c2"]);
    let refs = refs();
    let ctx = ResolveContext {
        ledger: &ledger,
        refs: &refs,
        failure_marker: &marker,
    };
    let mut prompter = Scripted::new(&["y", "", "", "", "too late"]);

    let outcome = resolve(&failing_report(), &ctx, Some(&mut prompter)).unwrap();

    assert!(!outcome.is_success());
    assert_eq!(prompter.asked, 4);
    assert!(ledger.note("eh-metrics-exclusions", "c2").is_none());
}

#[test]
fn anything_but_yes_declines() {
    let tmp = TempDir::new().unwrap();
    let marker = tmp.path().join("failure-marker");
    let ledger = MemoryLedger::with_history(&["c1", "c2"]);
    let refs = refs();
    let ctx = ResolveContext {
        ledger: &ledger,
        refs: &refs,
        failure_marker: &marker,
    };

    for answer in ["n", "yeah", ""] {
        let mut prompter = Scripted::new(&[answer, "reason"]);
        let outcome = resolve(&failing_report(), &ctx, Some(&mut prompter)).unwrap();
        assert!(!outcome.is_success(), "answer {answer:?} must not accept");
    }
    assert!(ledger.note("eh-metrics-exclusions", "c2").is_none());
}
