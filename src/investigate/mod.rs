//! Locating the lines behind a metric change by diffing two hit log sets.

pub mod diff;
mod fetch;

pub use fetch::{
    ArtifactFetcher, BUILD_PLACEHOLDER, ReqwestFetcher, artifact_url, download_logs, unpack_logs,
    verify_commit,
};

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use rayon::prelude::*;

use crate::hitlog::HitLogDir;
use crate::{EhMetricsError, Result};

const LOG_TARGET: &str = "eh_metrics::investigate";

/// What the last failing non-interactive check left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureMarker {
    pub commit: String,
    pub keys: Vec<String>,
    pub build: String,
}

impl FailureMarker {
    /// Parse `<commit>:<key>,<key>:<build>`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let (commit, rest) = text.trim().split_once(':')?;
        let (keys, build) = rest.rsplit_once(':')?;
        Some(Self {
            commit: commit.to_string(),
            keys: keys
                .split(',')
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect(),
            build: build.to_string(),
        })
    }

    /// Read the marker at `path`; `None` if there is none.
    ///
    /// # Errors
    /// Returns an error if the file exists but is unreadable or malformed.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(EhMetricsError::FileRead {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::parse(&text).map(Some).ok_or_else(|| {
            EhMetricsError::Config(format!("Malformed failure marker in {}", path.display()))
        })
    }

    /// Marker keys with the snapshot `prefix` removed, as hit logs name them.
    #[must_use]
    pub fn metric_keys(&self, prefix: &str) -> Vec<String> {
        self.keys
            .iter()
            .map(|key| strip_prefix(key, prefix).to_string())
            .collect()
    }
}

/// `jira.stats.usageof.X` with prefix `jira.stats` is `usageof.X`.
#[must_use]
pub fn strip_prefix<'a>(key: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return key;
    }
    key.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(key)
}

/// Diff of one metric's hit logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDiff {
    pub key: String,
    pub lines: Vec<String>,
}

impl MetricDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("=== {} ===\n", self.key);
        if self.lines.is_empty() {
            out.push_str("no differences\n");
        }
        for line in &self.lines {
            let _ = writeln!(out, "{line}");
        }
        out
    }
}

/// Diff the hit logs of every key in `keys`, previous against current.
/// Results keep the order of `keys`.
///
/// # Errors
/// Returns an error if an existing log cannot be read.
pub fn diff_logs(previous: &HitLogDir, current: &HitLogDir, keys: &[String]) -> Result<Vec<MetricDiff>> {
    keys.par_iter()
        .map(|key| {
            let old = previous.read_sorted(key)?;
            let new = current.read_sorted(key)?;
            log::debug!(
                target: LOG_TARGET,
                "{key}: {} previous, {} current hits",
                old.len(),
                new.len()
            );
            Ok(MetricDiff {
                key: key.clone(),
                lines: diff::ndiff(&old, &new),
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "investigate_tests.rs"]
mod tests;
