//! Metrics snapshots and the exclusions that widen their tolerance.
//!
//! A [`Snapshot`] is what a single scan produces and what the ledger stores on
//! an accepted commit. Serialized form:
//!
//! ```json
//! {
//!   "metrics": {
//!     "jira.stats.usageof.CacheBuilder": {
//!       "value": 16, "description": "...", "checked": true, "direction": "falling"
//!     }
//!   },
//!   "build_number": "current"
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{EhMetricsError, Result};

/// Build number recorded for snapshots that were not produced by CI.
pub const CURRENT_BUILD: &str = "current";

/// Which way a metric is expected to move.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Rising,
    Falling,
    Neutral,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rising => write!(f, "rising"),
            Self::Falling => write!(f, "falling"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

/// Value of a single metric together with how it is judged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricResult {
    pub value: i64,
    pub description: String,
    pub checked: bool,
    pub direction: Direction,
}

impl MetricResult {
    #[must_use]
    pub fn new(value: i64, description: impl Into<String>, checked: bool, direction: Direction) -> Self {
        Self {
            value,
            description: description.into(),
            checked,
            direction,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    metrics: BTreeMap<String, MetricResult>,
    #[serde(default = "current_build")]
    build_number: String,
}

fn current_build() -> String {
    CURRENT_BUILD.to_string()
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshot {
    #[must_use]
    pub fn new() -> Self {
        Self {
            metrics: BTreeMap::new(),
            build_number: current_build(),
        }
    }

    #[must_use]
    pub fn with_build_number(mut self, build_number: Option<String>) -> Self {
        self.build_number = build_number.unwrap_or_else(current_build);
        self
    }

    /// Parse a snapshot from its JSON note text.
    ///
    /// # Errors
    /// Returns an error if the text is not a valid snapshot document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize as the compact JSON blob stored in ledger notes.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load a snapshot previously written with [`Snapshot::save`].
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let file = fs::File::open(path).map_err(|e| EhMetricsError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Save the snapshot as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        crate::state::ensure_parent_dir(path)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn insert(&mut self, key: impl Into<String>, result: MetricResult) {
        self.metrics.insert(key.into(), result);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetricResult> {
        self.metrics.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.metrics.contains_key(key)
    }

    #[must_use]
    pub const fn metrics(&self) -> &BTreeMap<String, MetricResult> {
        &self.metrics
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }

    #[must_use]
    pub fn build_number(&self) -> &str {
        &self.build_number
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Raise accepted values to the ones negotiated in `exclusion`.
    ///
    /// Values are only ever raised. Keys the snapshot does not carry are
    /// ignored. Returns the keys whose value changed.
    pub fn apply_exclusion(&mut self, exclusion: &Exclusion) -> Vec<String> {
        let mut raised = Vec::new();
        for (key, accepted) in &exclusion.exclusion {
            if let Some(result) = self.metrics.get_mut(key)
                && *accepted > result.value
            {
                result.value = *accepted;
                raised.push(key.clone());
            }
        }
        raised
    }
}

/// A signed, justified acceptance of regressed metric values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exclusion {
    pub committer: String,
    pub reason: String,
    pub exclusion: BTreeMap<String, i64>,
}

impl Exclusion {
    #[must_use]
    pub fn new(committer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            committer: committer.into(),
            reason: reason.into(),
            exclusion: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: i64) -> Self {
        self.exclusion.insert(key.into(), value);
        self
    }

    /// Parse an exclusion from its JSON note text.
    ///
    /// # Errors
    /// Returns an error if the text is not a valid exclusion document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize as the compact JSON blob stored in ledger notes.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
