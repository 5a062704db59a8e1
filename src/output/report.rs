//! Data file behind the metrics history chart.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ledger::RecordedSnapshot;
use crate::snapshot::{CURRENT_BUILD, Snapshot};
use crate::state::ensure_parent_dir;

/// Accepted snapshots included when not configured otherwise.
pub const DEFAULT_MAX_POINTS: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportValue {
    pub description: String,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportPoint {
    pub end_commit: String,
    /// Seconds since the epoch.
    pub date: i64,
    pub build: String,
    pub values: BTreeMap<String, ReportValue>,
}

impl ReportPoint {
    fn new(end_commit: String, date: i64, snapshot: &Snapshot) -> Self {
        let values = snapshot
            .metrics()
            .iter()
            .map(|(key, result)| {
                (
                    key.clone(),
                    ReportValue {
                        description: result.description.clone(),
                        value: result.value,
                    },
                )
            })
            .collect();
        Self {
            end_commit,
            date,
            build: snapshot.build_number().to_string(),
            values,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportData {
    pub points: Vec<ReportPoint>,
}

impl ReportData {
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        ensure_parent_dir(path)?;
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// One point per accepted snapshot in `history` (oldest first), then
/// `current` under commit `head` if given.
#[must_use]
pub fn build_report(history: &[RecordedSnapshot], current: Option<(&str, &Snapshot)>, now: i64) -> ReportData {
    let mut points: Vec<ReportPoint> = history
        .iter()
        .map(|recorded| {
            ReportPoint::new(
                recorded.commit.hash.clone(),
                recorded.commit.timestamp,
                &recorded.snapshot,
            )
        })
        .collect();
    if let Some((head, snapshot)) = current {
        let mut point = ReportPoint::new(head.to_string(), now, snapshot);
        point.build = CURRENT_BUILD.to_string();
        points.push(point);
    }
    ReportData { points }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
