use crate::module_set::SourceFile;

use super::java::{brace_delta, code_of};
use super::{Collector, CollectorCore, FileFilter, Predicate};

#[derive(Debug, Clone, PartialEq, Eq)]
enum BlockState {
    Idle,
    /// Marker seen, block not opened yet.
    Armed {
        satisfied: bool,
        signature: Option<String>,
    },
    InBlock {
        depth: i32,
        satisfied: bool,
        signature: String,
    },
}

/// Counts marked blocks (e.g. `@Test` methods) that never make a required
/// call before their closing brace.
#[derive(Debug)]
pub struct MethodBlockCollector {
    core: CollectorCore,
    filter: FileFilter,
    marker: Predicate,
    required: Predicate,
    state: BlockState,
    file: String,
}

impl MethodBlockCollector {
    #[must_use]
    pub fn new(core: CollectorCore, filter: FileFilter, marker: Predicate, required: Predicate) -> Self {
        Self {
            core,
            filter,
            marker,
            required,
            state: BlockState::Idle,
            file: String::new(),
        }
    }

    fn finish(&mut self, satisfied: bool, signature: &str) {
        self.state = BlockState::Idle;
        if !satisfied {
            let evidence = format!("{}: {signature}", self.file);
            self.core.hit(&evidence);
        }
    }

    fn open_block(&mut self, satisfied: bool, signature: String, code: &str) {
        self.continue_block(brace_delta(code), satisfied, signature);
    }

    fn continue_block(&mut self, depth: i32, satisfied: bool, signature: String) {
        if depth <= 0 {
            self.finish(satisfied, &signature);
        } else {
            self.state = BlockState::InBlock {
                depth,
                satisfied,
                signature,
            };
        }
    }
}

impl Collector for MethodBlockCollector {
    fn core(&self) -> &CollectorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CollectorCore {
        &mut self.core
    }

    fn wants_file(&mut self, file: &SourceFile) -> bool {
        self.state = BlockState::Idle;
        file.name.clone_into(&mut self.file);
        self.filter.accepts(file)
    }

    fn on_read_line(&mut self, line: &str) -> bool {
        let Some(code) = code_of(line) else {
            return true;
        };
        let code = code.trim_end();
        match std::mem::replace(&mut self.state, BlockState::Idle) {
            BlockState::Idle => {
                if self.marker.matches(code) {
                    let satisfied = self.required.matches(code);
                    if code.contains('{') {
                        self.open_block(satisfied, code.to_string(), code);
                    } else {
                        self.state = BlockState::Armed {
                            satisfied,
                            signature: None,
                        };
                    }
                }
            }
            BlockState::Armed {
                satisfied,
                signature,
            } => {
                let satisfied = satisfied || self.required.matches(code);
                let signature = match signature {
                    Some(s) => s,
                    None if code.is_empty() || code.starts_with('@') => {
                        self.state = BlockState::Armed {
                            satisfied,
                            signature: None,
                        };
                        return true;
                    }
                    None => code.to_string(),
                };
                if code.contains('{') {
                    self.open_block(satisfied, signature, code);
                } else {
                    self.state = BlockState::Armed {
                        satisfied,
                        signature: Some(signature),
                    };
                }
            }
            BlockState::InBlock {
                depth,
                satisfied,
                signature,
            } => {
                let satisfied = satisfied || self.required.matches(code);
                self.continue_block(depth + brace_delta(code), satisfied, signature);
            }
        }
        true
    }
}

#[cfg(test)]
#[path = "method_block_tests.rs"]
mod tests;
