use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EhMetricsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glob pattern: {pattern}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Invalid regular expression: {pattern}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Metric key '{key}' is declared by both '{first}' and '{second}'")]
    DuplicateMetricKey {
        key: String,
        first: String,
        second: String,
    },

    #[error("Collector '{key}' is misconfigured: {reason}")]
    InvalidCollector { key: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON serialization error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Malformed note on commit {commit} in '{notes_ref}'")]
    MalformedNote {
        notes_ref: String,
        commit: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Git error: {0}")]
    Git(String),

    #[error("Not a git repository: {0}")]
    GitRepoNotFound(String),

    #[error("Working tree has uncommitted changes; commit them before recording {what}")]
    DirtyWorkspace { what: String },

    #[error("Failed to read archive: {path}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Command `{command}` failed: {detail}")]
    ExternalCommand { command: String, detail: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Hit logs in {dir} belong to commit {actual}, expected {expected}")]
    CommitMismatch {
        dir: PathBuf,
        expected: String,
        actual: String,
    },
}

pub type Result<T> = std::result::Result<T, EhMetricsError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
