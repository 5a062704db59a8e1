use crate::module_set::SourceFile;
use crate::snapshot::MetricResult;

use super::{Collector, CollectorCore, FileFilter};

/// Counts matching files and their total size without reading them.
///
/// Reports `<key>.count` and `<key>.cumulativesize`.
#[derive(Debug)]
pub struct FileCountCollector {
    core: CollectorCore,
    filter: FileFilter,
    count: i64,
    cumulative_size: i64,
}

impl FileCountCollector {
    #[must_use]
    pub fn new(key: &str, kind: &str, filter: FileFilter) -> Self {
        Self {
            core: CollectorCore::neutral(key, format!("{kind} files")),
            filter,
            count: 0,
            cumulative_size: 0,
        }
    }

    fn count_key(&self) -> String {
        format!("{}.count", self.core.key())
    }

    fn size_key(&self) -> String {
        format!("{}.cumulativesize", self.core.key())
    }
}

impl Collector for FileCountCollector {
    fn core(&self) -> &CollectorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CollectorCore {
        &mut self.core
    }

    fn metric_keys(&self) -> Vec<String> {
        vec![self.count_key(), self.size_key()]
    }

    fn wants_file(&mut self, file: &SourceFile) -> bool {
        if self.filter.accepts(file) {
            self.count += 1;
            self.cumulative_size += i64::try_from(file.size).unwrap_or(i64::MAX);
            let key = self.count_key();
            self.core.record(&key, &format!("{} ({} bytes)", file.name, file.size));
        }
        false
    }

    fn get_values(&mut self) -> Vec<(String, MetricResult)> {
        let kind = self.core.description().to_string();
        vec![
            (
                self.count_key(),
                MetricResult::new(self.count, format!("Number of {kind}"), false, self.core.direction()),
            ),
            (
                self.size_key(),
                MetricResult::new(
                    self.cumulative_size,
                    format!("Cumulative size of {kind} in bytes"),
                    false,
                    self.core.direction(),
                ),
            ),
        ]
    }
}

#[cfg(test)]
#[path = "file_count_tests.rs"]
mod tests;
