use crate::module_set::SourceFile;

use super::java::{code_of, is_type_declaration};
use super::{Collector, CollectorCore, FileFilter, Predicate, evidence};

/// Counts usages of a type only in files that import it.
///
/// Lines are skipped until an `import` statement matches the gate. A type
/// declaration reached without it releases the file; a `package` statement
/// closes the gate again.
#[derive(Debug)]
pub struct ImportGateCollector {
    core: CollectorCore,
    filter: FileFilter,
    import: Predicate,
    usage: Predicate,
    imported: bool,
    file: String,
}

impl ImportGateCollector {
    #[must_use]
    pub fn new(core: CollectorCore, filter: FileFilter, import: Predicate, usage: Predicate) -> Self {
        Self {
            core,
            filter,
            import,
            usage,
            imported: false,
            file: String::new(),
        }
    }
}

impl Collector for ImportGateCollector {
    fn core(&self) -> &CollectorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CollectorCore {
        &mut self.core
    }

    fn wants_file(&mut self, file: &SourceFile) -> bool {
        self.imported = false;
        file.name.clone_into(&mut self.file);
        self.filter.accepts(file)
    }

    fn on_read_line(&mut self, line: &str) -> bool {
        let Some(code) = code_of(line) else {
            return true;
        };
        if code.starts_with("package ") {
            self.imported = false;
            return true;
        }
        if code.starts_with("import ") {
            if self.import.matches(code) {
                self.imported = true;
            }
            return true;
        }
        if !self.imported {
            return !is_type_declaration(code);
        }
        if self.usage.matches(code) {
            let evidence = evidence(&self.file, line);
            self.core.hit(&evidence);
        }
        true
    }
}

#[cfg(test)]
#[path = "import_gate_tests.rs"]
mod tests;
