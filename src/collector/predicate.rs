use std::fmt;

use regex::Regex;

use crate::{EhMetricsError, Result};

/// A line matcher resolved once when a collector is built.
#[derive(Clone)]
pub enum Predicate {
    /// Line contains the substring.
    Literal(String),
    /// Line contains any of the substrings.
    AnyOf(Vec<String>),
    Regex(Regex),
    /// Line matches any of the expressions.
    AnyRegex(Vec<Regex>),
    Func(fn(&str) -> bool),
}

impl Predicate {
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    #[must_use]
    pub fn any_of<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AnyOf(texts.into_iter().map(Into::into).collect())
    }

    /// Compile a single regular expression.
    ///
    /// # Errors
    /// Returns an error if the pattern is not a valid expression.
    pub fn regex(pattern: &str) -> Result<Self> {
        Ok(Self::Regex(compile(pattern)?))
    }

    /// Compile a list of regular expressions OR'ed together.
    ///
    /// # Errors
    /// Returns an error naming the first invalid pattern.
    pub fn any_regex(patterns: &[&str]) -> Result<Self> {
        let compiled = patterns
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::AnyRegex(compiled))
    }

    #[must_use]
    pub fn matches(&self, line: &str) -> bool {
        match self {
            Self::Literal(text) => line.contains(text.as_str()),
            Self::AnyOf(texts) => texts.iter().any(|t| line.contains(t.as_str())),
            Self::Regex(re) => re.is_match(line),
            Self::AnyRegex(res) => res.iter().any(|re| re.is_match(line)),
            Self::Func(f) => f(line),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| EhMetricsError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Self::AnyOf(texts) => f.debug_tuple("AnyOf").field(texts).finish(),
            Self::Regex(re) => f.debug_tuple("Regex").field(&re.as_str()).finish(),
            Self::AnyRegex(res) => f
                .debug_tuple("AnyRegex")
                .field(&res.iter().map(Regex::as_str).collect::<Vec<_>>())
                .finish(),
            Self::Func(_) => f.write_str("Func(..)"),
        }
    }
}

#[cfg(test)]
#[path = "predicate_tests.rs"]
mod tests;
