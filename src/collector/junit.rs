use crate::module_set::SourceFile;
use crate::snapshot::{Direction, MetricResult};

use super::java::{code_of, extended_type, is_type_declaration};
use super::{Collector, CollectorCore, FileFilter};

/// Classifies test classes as JUnit 3 (extends `TestCase`) or JUnit 4
/// (`org.junit.Test` / `@Test`).
///
/// Reports `<key>.v3`, which must fall, and `<key>.v4`, which should rise.
#[derive(Debug)]
pub struct JUnitClassifierCollector {
    core: CollectorCore,
    filter: FileFilter,
    v3: i64,
    v4: i64,
    file: String,
}

impl JUnitClassifierCollector {
    #[must_use]
    pub fn new(key: &str, filter: FileFilter) -> Self {
        Self {
            core: CollectorCore::falling(key, "JUnit test classes"),
            filter,
            v3: 0,
            v4: 0,
            file: String::new(),
        }
    }

    fn v3_key(&self) -> String {
        format!("{}.v3", self.core.key())
    }

    fn v4_key(&self) -> String {
        format!("{}.v4", self.core.key())
    }
}

impl Collector for JUnitClassifierCollector {
    fn core(&self) -> &CollectorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CollectorCore {
        &mut self.core
    }

    fn metric_keys(&self) -> Vec<String> {
        vec![self.v3_key(), self.v4_key()]
    }

    fn wants_file(&mut self, file: &SourceFile) -> bool {
        file.name.clone_into(&mut self.file);
        self.filter.accepts(file)
    }

    fn on_read_line(&mut self, line: &str) -> bool {
        let Some(code) = code_of(line) else {
            return true;
        };
        if code.starts_with("import org.junit.Test;") || code.starts_with("@Test") {
            self.v4 += 1;
            let key = self.v4_key();
            self.core.record(&key, &self.file);
            return false;
        }
        if is_type_declaration(code) && extended_type(code).is_some_and(|t| t.ends_with("TestCase")) {
            self.v3 += 1;
            let key = self.v3_key();
            self.core.record(&key, &self.file);
            return false;
        }
        true
    }

    fn get_values(&mut self) -> Vec<(String, MetricResult)> {
        vec![
            (
                self.v3_key(),
                MetricResult::new(self.v3, "JUnit 3 test classes", true, Direction::Falling),
            ),
            (
                self.v4_key(),
                MetricResult::new(self.v4, "JUnit 4 test classes", false, Direction::Rising),
            ),
        ]
    }
}

#[cfg(test)]
#[path = "junit_tests.rs"]
mod tests;
