use crate::module_set::{Module, SourceFile};

use super::{Collector, CollectorCore, FileFilter, Predicate};

/// Counts modules that never prove themselves compliant.
///
/// Every module starts out presumed bad; a line matching the proof in any
/// accepted file clears it when the module closes.
#[derive(Debug)]
pub struct BadModuleCollector {
    core: CollectorCore,
    filter: FileFilter,
    proof: Predicate,
    proven: bool,
}

impl BadModuleCollector {
    #[must_use]
    pub const fn new(core: CollectorCore, filter: FileFilter, proof: Predicate) -> Self {
        Self {
            core,
            filter,
            proof,
            proven: false,
        }
    }
}

impl Collector for BadModuleCollector {
    fn core(&self) -> &CollectorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CollectorCore {
        &mut self.core
    }

    fn pre_files_scan(&mut self, _module: &Module) {
        self.proven = false;
        self.core.presume_hit();
    }

    fn wants_file(&mut self, file: &SourceFile) -> bool {
        !self.proven && self.filter.accepts(file)
    }

    fn on_read_line(&mut self, line: &str) -> bool {
        if self.proof.matches(line) {
            self.proven = true;
            return false;
        }
        true
    }

    fn post_files_scan(&mut self, module: &Module) {
        if self.proven {
            self.core.retract();
        } else {
            self.core.confirm(&module.name);
        }
    }
}

#[cfg(test)]
#[path = "bad_module_tests.rs"]
mod tests;
