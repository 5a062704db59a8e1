use std::path::PathBuf;

use crate::snapshot::MetricResult;
use crate::{Result, shell};

use super::{Collector, CollectorCore, LOG_TARGET, Predicate};

const DEPRECATION_WARNING: &str = r"\[deprecation\]|has been deprecated";

/// Counts compiler deprecation warnings reported by a full build.
///
/// The build only runs when values are requested; the collector never
/// looks at individual files.
#[derive(Debug)]
pub struct DeprecatedUsageCollector {
    core: CollectorCore,
    command: String,
    dir: PathBuf,
    warning: Predicate,
}

impl DeprecatedUsageCollector {
    /// # Errors
    /// Returns an error if the warning pattern fails to compile.
    pub fn new(key: &str, command: impl Into<String>, dir: impl Into<PathBuf>) -> Result<Self> {
        let warning = Predicate::regex(DEPRECATION_WARNING)?;
        Ok(Self {
            core: CollectorCore::falling(key, "Usages of deprecated methods").unchecked(),
            command: command.into(),
            dir: dir.into(),
            warning,
        })
    }

    /// Record one hit per distinct warning line in `output`.
    fn count_warnings(&mut self, output: &str) {
        let mut warnings: Vec<&str> = output
            .lines()
            .map(str::trim)
            .filter(|l| self.warning.matches(l))
            .collect();
        warnings.sort_unstable();
        warnings.dedup();
        for warning in warnings {
            self.core.hit(warning);
        }
    }
}

impl Collector for DeprecatedUsageCollector {
    fn core(&self) -> &CollectorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CollectorCore {
        &mut self.core
    }

    fn is_lazy(&self) -> bool {
        true
    }

    fn get_values(&mut self) -> Vec<(String, MetricResult)> {
        log::info!(target: LOG_TARGET, "Compiling with `{}` to collect deprecation warnings", self.command);
        match shell::run(&self.command, &self.dir) {
            Ok(output) => {
                self.count_warnings(&output);
                vec![(self.core.key().to_string(), self.core.result())]
            }
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Skipping {}: {e}", self.core.key());
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
#[path = "deprecation_tests.rs"]
mod tests;
