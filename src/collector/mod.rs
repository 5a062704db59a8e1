//! Line-oriented metric collectors.
//!
//! A collector is offered every file of every module of the module set it
//! belongs to. Per file it moves from idle to scanning when [`Collector::wants_file`]
//! returns true, and back to idle when [`Collector::on_read_line`] returns false
//! or the file ends. Module boundaries are bracketed by
//! [`Collector::pre_files_scan`] and [`Collector::post_files_scan`].

mod api_manager;
mod assert_message;
mod bad_module;
mod deprecation;
mod file_count;
mod filter;
mod grep;
mod import_gate;
pub mod java;
mod junit;
mod method_block;
mod predicate;
mod scope;
pub mod tokens;

pub use api_manager::ApiManagerCollector;
pub use assert_message::{AssertMessageCollector, JUNIT_ASSERTIONS};
pub use bad_module::BadModuleCollector;
pub use deprecation::DeprecatedUsageCollector;
pub use file_count::FileCountCollector;
pub use filter::FileFilter;
pub use grep::GrepCollector;
pub use import_gate::ImportGateCollector;
pub use junit::JUnitClassifierCollector;
pub use method_block::MethodBlockCollector;
pub use predicate::Predicate;
pub use scope::ScopeActivator;

use indexmap::IndexMap;

use crate::hitlog::{HitLog, HitLogDir};
use crate::module_set::{Module, SourceFile};
use crate::snapshot::{Direction, MetricResult};
use crate::{EhMetricsError, Result};

const LOG_TARGET: &str = "eh_metrics::collector";

/// A unit of measurement driven by the scan engine.
///
/// Only the hooks a collector needs have to be implemented; the defaults
/// ignore every file.
pub trait Collector {
    fn core(&self) -> &CollectorCore;

    fn core_mut(&mut self) -> &mut CollectorCore;

    /// Metric keys this collector reports, without the snapshot prefix.
    fn metric_keys(&self) -> Vec<String> {
        vec![self.core().key().to_string()]
    }

    /// Lazy collectors compute their value in [`Collector::get_values`] and are
    /// never offered files.
    fn is_lazy(&self) -> bool {
        false
    }

    fn pre_files_scan(&mut self, _module: &Module) {}

    /// Decide from the file's name whether its lines are wanted. Per-file
    /// scratch state is reset here.
    fn wants_file(&mut self, _file: &SourceFile) -> bool {
        false
    }

    /// Inspect one line; return false to release the file.
    fn on_read_line(&mut self, _line: &str) -> bool {
        false
    }

    fn post_files_scan(&mut self, _module: &Module) {}

    fn get_values(&mut self) -> Vec<(String, MetricResult)> {
        let core = self.core();
        vec![(core.key().to_string(), core.result())]
    }
}

/// Identity, running value and evidence logs shared by every collector.
#[derive(Debug)]
pub struct CollectorCore {
    key: String,
    description: String,
    direction: Direction,
    checked: bool,
    value: i64,
    verbose: bool,
    logs: Option<HitLogDir>,
    writers: IndexMap<String, HitLog>,
}

impl CollectorCore {
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        description: impl Into<String>,
        direction: Direction,
        checked: bool,
    ) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            direction,
            checked,
            value: 0,
            verbose: false,
            logs: None,
            writers: IndexMap::new(),
        }
    }

    /// A checked metric that must not grow.
    #[must_use]
    pub fn falling(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(key, description, Direction::Falling, true)
    }

    /// A checked metric that must not shrink.
    #[must_use]
    pub fn rising(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(key, description, Direction::Rising, true)
    }

    /// An informational metric.
    #[must_use]
    pub fn neutral(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(key, description, Direction::Neutral, false)
    }

    #[must_use]
    pub fn unchecked(mut self) -> Self {
        self.checked = false;
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub const fn checked(&self) -> bool {
        self.checked
    }

    #[must_use]
    pub const fn value(&self) -> i64 {
        self.value
    }

    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    pub const fn configure(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Reject identities the snapshot format cannot represent.
    ///
    /// # Errors
    /// Returns an error for an empty key, a key with a comma, or a checked
    /// neutral metric.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| EhMetricsError::InvalidCollector {
            key: self.key.clone(),
            reason: reason.to_string(),
        };
        if self.key.is_empty() {
            return Err(invalid("key must not be empty"));
        }
        if self.key.contains(',') {
            return Err(invalid("key must not contain ','"));
        }
        if self.direction == Direction::Neutral && self.checked {
            return Err(invalid("a neutral metric cannot be checked"));
        }
        Ok(())
    }

    /// Open (append) the hit logs of `keys` for the coming module.
    ///
    /// # Errors
    /// Returns an error if a log cannot be opened.
    pub fn open_logs(&mut self, dir: &HitLogDir, keys: &[String]) -> Result<()> {
        self.close_logs();
        self.logs = Some(dir.clone());
        for key in keys {
            let log = dir.open(key)?;
            self.writers.insert(key.clone(), log);
        }
        Ok(())
    }

    /// Flush and close every open hit log.
    pub fn close_logs(&mut self) {
        for (key, mut log) in self.writers.drain(..) {
            if let Err(e) = log.flush() {
                log::warn!(target: LOG_TARGET, "Failed to flush hit log for {key}: {e}");
            }
        }
    }

    /// Count one violation of this collector's own metric.
    pub fn hit(&mut self, evidence: &str) {
        let key = self.key.clone();
        self.hit_for(&key, evidence);
    }

    /// Count one violation, logging the evidence under `key`.
    pub fn hit_for(&mut self, key: &str, evidence: &str) {
        self.value += 1;
        self.record(key, evidence);
    }

    /// Log evidence under `key` without touching the value. Used by
    /// collectors that keep their own counters.
    pub fn record(&mut self, key: &str, evidence: &str) {
        if self.verbose {
            log::debug!(target: LOG_TARGET, "[{key}] {evidence}");
        }
        if !self.writers.contains_key(key) {
            let Some(dir) = &self.logs else {
                return;
            };
            match dir.open(key) {
                Ok(log) => {
                    self.writers.insert(key.to_string(), log);
                }
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "Cannot open hit log for {key}: {e}");
                    return;
                }
            }
        }
        if let Some(log) = self.writers.get_mut(key)
            && let Err(e) = log.write(evidence)
        {
            log::warn!(target: LOG_TARGET, "Cannot write hit log for {key}: {e}");
        }
    }

    /// Count a module as violating before its files are seen. The verdict is
    /// settled by [`CollectorCore::retract`] or [`CollectorCore::confirm`].
    pub(crate) const fn presume_hit(&mut self) {
        self.value += 1;
    }

    /// Undo a presumed hit once the module proved compliant.
    pub(crate) const fn retract(&mut self) {
        self.value -= 1;
    }

    /// Keep a presumed hit, logging its evidence.
    pub(crate) fn confirm(&mut self, evidence: &str) {
        let key = self.key.clone();
        self.record(&key, evidence);
    }

    /// Result for this collector's own key.
    #[must_use]
    pub fn result(&self) -> MetricResult {
        self.result_with(self.value)
    }

    /// Result carrying this collector's identity with an explicit value.
    #[must_use]
    pub fn result_with(&self, value: i64) -> MetricResult {
        MetricResult::new(value, self.description.clone(), self.checked, self.direction)
    }
}

/// Evidence line naming the file and the offending line.
pub(crate) fn evidence(file: &str, line: &str) -> String {
    format!("{file}: {}", line.trim())
}

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
