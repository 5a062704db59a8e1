use indexmap::IndexMap;

use crate::module_set::SourceFile;

use super::tokens::{Token, tokenize};
use super::{Collector, CollectorCore, FileFilter};

/// Assertion methods and the argument count of their message-less form.
pub const JUNIT_ASSERTIONS: &[(&str, usize)] = &[
    ("assertTrue", 1),
    ("assertFalse", 1),
    ("assertNull", 1),
    ("assertNotNull", 1),
    ("assertEquals", 2),
    ("assertNotEquals", 2),
    ("assertSame", 2),
    ("assertNotSame", 2),
    ("assertArrayEquals", 2),
    ("assertThat", 2),
];

#[derive(Debug)]
struct OpenCall {
    limit: usize,
    depth: usize,
    separators: usize,
    has_argument: bool,
    evidence: String,
}

/// Counts calls that pass no more arguments than the message-less form
/// takes, following calls across lines.
#[derive(Debug)]
pub struct AssertMessageCollector {
    core: CollectorCore,
    filter: FileFilter,
    methods: IndexMap<String, usize>,
    call: Option<OpenCall>,
    file: String,
}

impl AssertMessageCollector {
    #[must_use]
    pub fn new(core: CollectorCore, filter: FileFilter, methods: &[(&str, usize)]) -> Self {
        Self {
            core,
            filter,
            methods: methods.iter().map(|(m, n)| ((*m).to_string(), *n)).collect(),
            call: None,
            file: String::new(),
        }
    }

    fn close_call(&mut self, call: OpenCall) {
        let args = call.separators + usize::from(call.has_argument);
        if args <= call.limit {
            self.core.hit(&call.evidence);
        }
    }
}

impl Collector for AssertMessageCollector {
    fn core(&self) -> &CollectorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CollectorCore {
        &mut self.core
    }

    fn wants_file(&mut self, file: &SourceFile) -> bool {
        self.call = None;
        file.name.clone_into(&mut self.file);
        self.filter.accepts(file)
    }

    fn on_read_line(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        if self.call.is_none() && (trimmed.starts_with("//") || trimmed.starts_with('*')) {
            return true;
        }
        for token in tokenize(line) {
            if self.call.is_none() {
                if let Some(&limit) = token.callee().and_then(|c| self.methods.get(c)) {
                    self.call = Some(OpenCall {
                        limit,
                        depth: 1,
                        separators: 0,
                        has_argument: false,
                        evidence: format!("{}: {}", self.file, line.trim()),
                    });
                }
                continue;
            }
            let Some(call) = self.call.as_mut() else {
                continue;
            };
            match token {
                Token::CallStart(_) | Token::Open => {
                    call.depth += 1;
                    call.has_argument = true;
                }
                Token::Close => {
                    call.depth -= 1;
                    if call.depth == 0
                        && let Some(done) = self.call.take()
                    {
                        self.close_call(done);
                    }
                }
                Token::Separator if call.depth == 1 => call.separators += 1,
                Token::Separator | Token::Other => call.has_argument = true,
                Token::Whitespace => {}
            }
        }
        true
    }
}

#[cfg(test)]
#[path = "assert_message_tests.rs"]
mod tests;
