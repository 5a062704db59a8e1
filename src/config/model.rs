use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ledger::NoteRefs;
use crate::output::DEFAULT_MAX_POINTS;

/// Supported config version.
pub const CONFIG_VERSION: &str = "1";

pub const DEFAULT_PREFIX: &str = "jira.stats";
pub const DEFAULT_SNAPSHOT_REF: &str = "eh-metrics";
pub const DEFAULT_EXCLUSION_REF: &str = "eh-metrics-exclusions";
pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_MAX_DEPTH: usize = 8;

const fn default_true() -> bool {
    true
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

const fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_archives() -> Vec<String> {
    vec!["**/plugins/**/target/*".to_string()]
}

#[allow(clippy::unnecessary_wraps)]
fn default_remote() -> Option<String> {
    Some(DEFAULT_REMOTE.to_string())
}

fn default_snapshot_ref() -> String {
    DEFAULT_SNAPSHOT_REF.to_string()
}

fn default_exclusion_ref() -> String {
    DEFAULT_EXCLUSION_REF.to_string()
}

const fn default_max_points() -> usize {
    DEFAULT_MAX_POINTS
}

/// What gets measured [metrics].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Prefix of every snapshot key.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Hit log directory (default: inside the state directory).
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Compiler invocation whose warnings count deprecated method usages.
    #[serde(default)]
    pub compile_command: Option<String>,

    #[serde(default = "default_true")]
    pub include_tests: bool,

    #[serde(default = "default_true")]
    pub include_plugins: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            log_dir: None,
            compile_command: None,
            include_tests: true,
            include_plugins: true,
        }
    }
}

/// Module discovery in the source tree [modules].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModulesConfig {
    /// Glob patterns of paths never scanned.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// How deep below the root modules are searched for.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Packaged plugin archives [plugins].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PluginsConfig {
    /// Glob patterns selecting `.jar`/`.obr` archives, relative to the root.
    #[serde(default = "default_archives")]
    pub archives: Vec<String>,

    /// Builds the archives; skipped while its marker is fresh.
    #[serde(default)]
    pub package_command: Option<String>,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            archives: default_archives(),
            package_command: None,
        }
    }
}

/// Where accepted snapshots and exclusions live [ledger].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Remote notes are fetched from and pushed to. Empty disables syncing.
    #[serde(default = "default_remote")]
    pub remote: Option<String>,

    #[serde(default = "default_snapshot_ref")]
    pub snapshot_ref: String,

    #[serde(default = "default_exclusion_ref")]
    pub exclusion_ref: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            snapshot_ref: default_snapshot_ref(),
            exclusion_ref: default_exclusion_ref(),
        }
    }
}

impl LedgerConfig {
    #[must_use]
    pub fn note_refs(&self) -> NoteRefs {
        NoteRefs {
            snapshots: self.snapshot_ref.clone(),
            exclusions: self.exclusion_ref.clone(),
        }
    }
}

/// [investigate]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvestigateConfig {
    /// URL of a build's zipped hit logs, with `{build}` as placeholder.
    #[serde(default)]
    pub artifact_url: Option<String>,
}

/// [report]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportConfig {
    #[serde(default = "default_max_points")]
    pub max_points: usize,

    /// Data file path (default: inside the state directory).
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_MAX_POINTS,
            output: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub metrics: MetricsConfig,

    #[serde(default)]
    pub modules: ModulesConfig,

    #[serde(default)]
    pub plugins: PluginsConfig,

    #[serde(default)]
    pub ledger: LedgerConfig,

    #[serde(default)]
    pub investigate: InvestigateConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
