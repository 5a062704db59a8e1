use crate::module_set::SourceFile;

use super::{Collector, CollectorCore, FileFilter, Predicate, ScopeActivator, evidence};

/// Counts lines matching a predicate in the files a filter accepts.
///
/// Optionally only lines inside a [`ScopeActivator`] count, and a stop
/// predicate releases the file early.
#[derive(Debug)]
pub struct GrepCollector {
    core: CollectorCore,
    filter: FileFilter,
    target: Predicate,
    scope: Option<ScopeActivator>,
    stop_at: Option<Predicate>,
    file: String,
}

impl GrepCollector {
    #[must_use]
    pub fn new(core: CollectorCore, filter: FileFilter, target: Predicate) -> Self {
        Self {
            core,
            filter,
            target,
            scope: None,
            stop_at: None,
            file: String::new(),
        }
    }

    #[must_use]
    pub fn within(mut self, scope: ScopeActivator) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Release the file on the first line matching `stop`. The stop line
    /// itself is not inspected.
    #[must_use]
    pub fn stop_at(mut self, stop: Predicate) -> Self {
        self.stop_at = Some(stop);
        self
    }
}

impl Collector for GrepCollector {
    fn core(&self) -> &CollectorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CollectorCore {
        &mut self.core
    }

    fn wants_file(&mut self, file: &SourceFile) -> bool {
        if let Some(scope) = &mut self.scope {
            scope.reset();
        }
        file.name.clone_into(&mut self.file);
        self.filter.accepts(file)
    }

    fn on_read_line(&mut self, line: &str) -> bool {
        if self.stop_at.as_ref().is_some_and(|p| p.matches(line)) {
            return false;
        }
        let in_scope = self.scope.as_mut().is_none_or(|s| s.advance(line));
        if in_scope && self.target.matches(line) {
            let evidence = evidence(&self.file, line);
            self.core.hit(&evidence);
        }
        true
    }
}

#[cfg(test)]
#[path = "grep_tests.rs"]
mod tests;
