//! State file path resolution with git-awareness.
//!
//! When the project root is a git repository, run state lives in
//! `.git/eh-metrics/` (never committed). Otherwise it falls back to
//! `.eh-metrics/` in the project root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const STATE_DIR_NAME: &str = "eh-metrics";
const FALLBACK_STATE_DIR: &str = ".eh-metrics";
const HIT_LOG_DIR: &str = "hit-logs";
const PREVIOUS_LOG_DIR: &str = "previous-logs";
const FAILURE_MARKER_FILENAME: &str = "failure-marker";
const PACKAGED_MARKER_FILENAME: &str = "packaged.marker";
const REPORT_FILENAME: &str = "report-data.json";
const JUNIT_FILENAME: &str = "eh-metrics-junit.xml";

/// Name of the project configuration file.
pub const CONFIG_FILENAME: &str = ".eh-metrics.toml";

/// Detect the state directory for run artifacts.
///
/// Returns `.git/eh-metrics/` if the project root has a `.git` directory,
/// otherwise returns `.eh-metrics/`.
///
/// Note: This only checks for `.git` in the immediate project root, not parent directories.
#[must_use]
pub fn detect_state_dir(project_root: &Path) -> PathBuf {
    let git_dir = project_root.join(".git");
    if git_dir.is_dir() {
        git_dir.join(STATE_DIR_NAME)
    } else {
        project_root.join(FALLBACK_STATE_DIR)
    }
}

/// Directory receiving this run's hit logs, unless configured elsewhere.
#[must_use]
pub fn hit_log_dir(project_root: &Path) -> PathBuf {
    detect_state_dir(project_root).join(HIT_LOG_DIR)
}

/// Directory the investigator unpacks downloaded hit logs into.
#[must_use]
pub fn previous_log_dir(project_root: &Path) -> PathBuf {
    detect_state_dir(project_root).join(PREVIOUS_LOG_DIR)
}

/// Marker recording the baseline of the last failed non-interactive check.
#[must_use]
pub fn failure_marker_path(project_root: &Path) -> PathBuf {
    detect_state_dir(project_root).join(FAILURE_MARKER_FILENAME)
}

/// Fingerprint of the last plugin packaging run.
#[must_use]
pub fn packaged_marker_path(project_root: &Path) -> PathBuf {
    detect_state_dir(project_root).join(PACKAGED_MARKER_FILENAME)
}

#[must_use]
pub fn report_path(project_root: &Path) -> PathBuf {
    detect_state_dir(project_root).join(REPORT_FILENAME)
}

#[must_use]
pub fn junit_path(project_root: &Path) -> PathBuf {
    detect_state_dir(project_root).join(JUNIT_FILENAME)
}

/// Ensure the parent directory exists for a given path.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Discover the project root by walking up from `start` looking for markers.
///
/// Markers (checked in order at each directory level):
///   1. `.git/` directory - git repository root
///   2. `.eh-metrics.toml` - explicit configuration
///
/// Returns `start` if no markers found.
/// If `start` cannot be canonicalized, returns it as-is.
#[must_use]
pub fn discover_project_root(start: &Path) -> PathBuf {
    let abs_start = dunce::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());

    for ancestor in abs_start.ancestors() {
        if ancestor.join(".git").is_dir() {
            return ancestor.to_path_buf();
        }
        if ancestor.join(CONFIG_FILENAME).is_file() {
            return ancestor.to_path_buf();
        }
    }

    abs_start
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
