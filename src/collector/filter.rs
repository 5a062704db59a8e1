use crate::module_set::SourceFile;

use super::Predicate;

/// Name-based file interest shared by collectors.
///
/// A file is wanted when its name ends with one of the suffixes (or no
/// suffixes are configured) and, if set, the name also satisfies the path
/// predicate. Names always use `/` separators.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    suffixes: Vec<String>,
    path: Option<Predicate>,
}

impl FileFilter {
    #[must_use]
    pub fn suffixes<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffixes: suffixes.into_iter().map(Into::into).collect(),
            path: None,
        }
    }

    #[must_use]
    pub fn with_path(mut self, predicate: Predicate) -> Self {
        self.path = Some(predicate);
        self
    }

    #[must_use]
    pub fn accepts_name(&self, name: &str) -> bool {
        let suffix_ok =
            self.suffixes.is_empty() || self.suffixes.iter().any(|s| name.ends_with(s.as_str()));
        suffix_ok && self.path.as_ref().is_none_or(|p| p.matches(name))
    }

    #[must_use]
    pub fn accepts(&self, file: &SourceFile) -> bool {
        self.accepts_name(&file.name)
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
