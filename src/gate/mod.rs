//! Compares a fresh snapshot to the last accepted one.

mod resolve;

pub use resolve::{GateOutcome, Prompter, ResolveContext, StdinPrompter, resolve};

use crate::Result;
use crate::ledger::{self, Ledger, NoteRefs};
use crate::snapshot::{Direction, MetricResult, Snapshot};

const LOG_TARGET: &str = "eh_metrics::gate";

/// Appended to every failure explanation.
pub const INVESTIGATE_HINT: &str =
    "Run `eh-metrics investigate` to see which lines changed since the baseline build.";

/// The accepted snapshot a run is judged against, with exclusions applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Baseline {
    pub commit: String,
    pub snapshot: Snapshot,
    /// Keys whose accepted value was raised by an exclusion.
    pub raised: Vec<String>,
}

impl Baseline {
    #[must_use]
    pub fn build_number(&self) -> &str {
        self.snapshot.build_number()
    }
}

/// Latest accepted snapshot raised by every exclusion recorded since.
///
/// # Errors
/// Returns an error if history cannot be read or the snapshot note is
/// malformed.
pub fn load_baseline(ledger: &dyn Ledger, refs: &NoteRefs) -> Result<Option<Baseline>> {
    let Some(recorded) = ledger::latest_snapshot(ledger, refs)? else {
        log::info!(target: LOG_TARGET, "No accepted metrics found; this build sets the baseline");
        return Ok(None);
    };
    let commit = recorded.commit.hash;
    let mut snapshot = recorded.snapshot;
    let mut raised = Vec::new();
    for exclusion in ledger::exclusions_since(ledger, refs, &commit)? {
        log::info!(
            target: LOG_TARGET,
            "Applying exclusion by {}: {}",
            exclusion.committer,
            exclusion.reason
        );
        raised.extend(snapshot.apply_exclusion(&exclusion));
    }
    Ok(Some(Baseline {
        commit,
        snapshot,
        raised,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Within tolerance, or not judged.
    Passed,
    Improved,
    /// Not present in the baseline.
    New,
    Regressed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricCheck {
    pub key: String,
    pub status: CheckStatus,
    pub value: i64,
    pub baseline: Option<i64>,
    pub message: String,
}

impl MetricCheck {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status == CheckStatus::Regressed
    }
}

/// Result of judging one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateReport {
    pub baseline_commit: Option<String>,
    pub baseline_build: Option<String>,
    pub checks: Vec<MetricCheck>,
    /// Baseline keys the current snapshot no longer carries.
    pub missing: Vec<String>,
}

impl GateReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.checks.iter().any(MetricCheck::is_failure)
    }

    pub fn regressions(&self) -> impl Iterator<Item = &MetricCheck> {
        self.checks.iter().filter(|c| c.is_failure())
    }

    /// `<baseline commit>:<regressed keys>:<baseline build>`, when failing.
    #[must_use]
    pub fn failure_marker(&self) -> Option<String> {
        if self.is_success() {
            return None;
        }
        let keys: Vec<&str> = self.regressions().map(|c| c.key.as_str()).collect();
        Some(format!(
            "{}:{}:{}",
            self.baseline_commit.as_deref().unwrap_or_default(),
            keys.join(","),
            self.baseline_build.as_deref().unwrap_or_default()
        ))
    }

    /// Regression messages followed by the investigate hint.
    #[must_use]
    pub fn explain(&self) -> String {
        let mut lines: Vec<String> = self.regressions().map(|c| c.message.clone()).collect();
        lines.push(INVESTIGATE_HINT.to_string());
        lines.join("\n")
    }
}

/// Judge every metric of `current` against `baseline`.
///
/// `filtered` suppresses warnings about baseline keys that were not scanned.
#[must_use]
pub fn evaluate(current: &Snapshot, baseline: Option<&Baseline>, filtered: bool) -> GateReport {
    let Some(baseline) = baseline else {
        let checks = current
            .metrics()
            .iter()
            .map(|(key, result)| MetricCheck {
                key: key.clone(),
                status: CheckStatus::Passed,
                value: result.value,
                baseline: None,
                message: format!("{key} = {} (no baseline)", result.value),
            })
            .collect();
        return GateReport {
            baseline_commit: None,
            baseline_build: None,
            checks,
            missing: Vec::new(),
        };
    };

    let checks = current
        .metrics()
        .iter()
        .map(|(key, result)| match baseline.snapshot.get(key) {
            Some(old) => compare(key, old.value, result),
            None => {
                log::info!(target: LOG_TARGET, "New metric {key} = {}", result.value);
                MetricCheck {
                    key: key.clone(),
                    status: CheckStatus::New,
                    value: result.value,
                    baseline: None,
                    message: format!("new metric {key} = {}", result.value),
                }
            }
        })
        .collect();

    let missing: Vec<String> = baseline
        .snapshot
        .keys()
        .filter(|key| !current.contains(key))
        .map(str::to_string)
        .collect();
    if !filtered {
        for key in &missing {
            log::warn!(target: LOG_TARGET, "Metric {key} is in the baseline but was not collected");
        }
    }

    GateReport {
        baseline_commit: Some(baseline.commit.clone()),
        baseline_build: Some(baseline.build_number().to_string()),
        checks,
        missing,
    }
}

fn compare(key: &str, old: i64, current: &MetricResult) -> MetricCheck {
    let new = current.value;
    let judged = current.checked && current.direction != Direction::Neutral;
    let (regressed, improved) = match current.direction {
        Direction::Falling => (new > old, new < old),
        Direction::Rising => (new < old, new > old),
        Direction::Neutral => (false, false),
    };

    let message = if new > old {
        format!("{key} increased from {old} to {new}")
    } else if new < old {
        format!("{key} decreased from {old} to {new}")
    } else {
        format!("{key} unchanged at {new}")
    };

    let status = if regressed && judged {
        log::error!(target: LOG_TARGET, "{message} ({})", current.description);
        CheckStatus::Regressed
    } else if improved && judged {
        if current.direction == Direction::Falling && new == 0 {
            log::info!(
                target: LOG_TARGET,
                "Achievement unlocked: {} ({key}) is down to zero!",
                current.description
            );
        } else {
            log::info!(target: LOG_TARGET, "Improvement: {message}");
        }
        CheckStatus::Improved
    } else {
        log::debug!(target: LOG_TARGET, "{message}");
        if improved { CheckStatus::Improved } else { CheckStatus::Passed }
    };

    MetricCheck {
        key: key.to_string(),
        status,
        value: new,
        baseline: Some(old),
        message,
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
