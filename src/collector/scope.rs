use super::Predicate;

/// Tracks whether lines are inside a start/stop marker pair.
#[derive(Debug, Clone)]
pub struct ScopeActivator {
    start: Predicate,
    stop: Predicate,
    active: bool,
}

impl ScopeActivator {
    #[must_use]
    pub const fn new(start: Predicate, stop: Predicate) -> Self {
        Self {
            start,
            stop,
            active: false,
        }
    }

    /// Consume one line and report whether it is in scope.
    ///
    /// The line is judged against the state left by the previous line; only
    /// then does a start marker activate and a stop marker deactivate the
    /// scope. A line carrying both markers ends inactive.
    pub fn advance(&mut self, line: &str) -> bool {
        let in_scope = self.active;
        if self.start.matches(line) {
            self.active = true;
        }
        if self.stop.matches(line) {
            self.active = false;
        }
        in_scope
    }

    pub const fn reset(&mut self) {
        self.active = false;
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;
