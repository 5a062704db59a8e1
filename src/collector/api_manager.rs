use crate::module_set::{Module, SourceFile};
use crate::snapshot::MetricResult;

use super::java::{code_of, is_interface_declaration, is_type_declaration};
use super::{Collector, CollectorCore, FileFilter};

/// Counts manager interfaces published by API modules.
///
/// Reports `<key>` for every manager interface and
/// `<key>.not_deprecated` for those not marked deprecated.
#[derive(Debug)]
pub struct ApiManagerCollector {
    core: CollectorCore,
    module_fragment: String,
    filter: FileFilter,
    in_api_module: bool,
    deprecated: bool,
    total: i64,
    not_deprecated: i64,
    file: String,
}

impl ApiManagerCollector {
    #[must_use]
    pub fn new(key: &str, module_fragment: impl Into<String>) -> Self {
        Self {
            core: CollectorCore::falling(key, "Manager interfaces in the public API"),
            module_fragment: module_fragment.into(),
            filter: FileFilter::suffixes(["Manager.java"]),
            in_api_module: false,
            deprecated: false,
            total: 0,
            not_deprecated: 0,
            file: String::new(),
        }
    }

    fn not_deprecated_key(&self) -> String {
        format!("{}.not_deprecated", self.core.key())
    }
}

impl Collector for ApiManagerCollector {
    fn core(&self) -> &CollectorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CollectorCore {
        &mut self.core
    }

    fn metric_keys(&self) -> Vec<String> {
        vec![self.core.key().to_string(), self.not_deprecated_key()]
    }

    fn pre_files_scan(&mut self, module: &Module) {
        self.in_api_module = module.name.contains(self.module_fragment.as_str());
    }

    fn wants_file(&mut self, file: &SourceFile) -> bool {
        self.deprecated = false;
        file.name.clone_into(&mut self.file);
        self.in_api_module && self.filter.accepts(file)
    }

    fn on_read_line(&mut self, line: &str) -> bool {
        if line.contains("@Deprecated") || line.contains("@deprecated") {
            self.deprecated = true;
        }
        let Some(code) = code_of(line) else {
            return true;
        };
        if is_interface_declaration(code) {
            self.total += 1;
            let key = self.core.key().to_string();
            self.core.record(&key, &self.file);
            if !self.deprecated {
                self.not_deprecated += 1;
                let key = self.not_deprecated_key();
                self.core.record(&key, &self.file);
            }
            return false;
        }
        !is_type_declaration(code)
    }

    fn get_values(&mut self) -> Vec<(String, MetricResult)> {
        vec![
            (self.core.key().to_string(), self.core.result_with(self.total)),
            (
                self.not_deprecated_key(),
                MetricResult::new(
                    self.not_deprecated,
                    "Manager interfaces in the public API not marked deprecated",
                    self.core.checked(),
                    self.core.direction(),
                ),
            ),
        ]
    }
}

#[cfg(test)]
#[path = "api_manager_tests.rs"]
mod tests;
