//! Per-metric evidence logs.
//!
//! Every run writes one `eh-metrics-hit-for-<key>.log` file per metric key into
//! a run directory, plus a `.commit` marker naming the commit the logs were
//! produced from. Readers compare logs on their sorted lines.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::{EhMetricsError, Result};

const FILE_PREFIX: &str = "eh-metrics-hit-for-";
const FILE_SUFFIX: &str = ".log";

/// Name of the marker file recording the commit the logs belong to.
pub const COMMIT_MARKER: &str = ".commit";

/// File name of the hit log for `key`.
#[must_use]
pub fn file_name(key: &str) -> String {
    format!("{FILE_PREFIX}{key}{FILE_SUFFIX}")
}

/// Metric key encoded in a hit log file name, if it is one.
#[must_use]
pub fn key_from_file_name(name: &str) -> Option<&str> {
    name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)
}

/// Directory holding the hit logs of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitLogDir {
    dir: PathBuf,
}

impl HitLogDir {
    /// Use an existing directory without touching its content.
    #[must_use]
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Prepare the directory for a fresh run.
    ///
    /// Hit logs of the previous run are removed and the commit marker is
    /// rewritten, so every log opened afterwards starts empty.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or cleaned.
    pub fn create(dir: impl Into<PathBuf>, commit: Option<&str>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if name.to_str().and_then(key_from_file_name).is_some() {
                fs::remove_file(entry.path())?;
            }
        }
        let marker = dir.join(COMMIT_MARKER);
        match commit {
            Some(commit) => fs::write(&marker, format!("{commit}\n"))?,
            None if marker.exists() => fs::remove_file(&marker)?,
            None => {}
        }
        Ok(Self { dir })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn log_path(&self, key: &str) -> PathBuf {
        self.dir.join(file_name(key))
    }

    /// Open the log for `key` in append mode.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn open(&self, key: &str) -> Result<HitLog> {
        let path = self.log_path(key);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| EhMetricsError::FileRead {
                path: path.clone(),
                source: e,
            })?;
        Ok(HitLog {
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Commit recorded in the `.commit` marker.
    #[must_use]
    pub fn commit(&self) -> Option<String> {
        let content = fs::read_to_string(self.dir.join(COMMIT_MARKER)).ok()?;
        let commit = content.trim();
        (!commit.is_empty()).then(|| commit.to_string())
    }

    /// Lines of the log for `key`, sorted. A missing log reads as empty.
    ///
    /// # Errors
    /// Returns an error if an existing log cannot be read.
    pub fn read_sorted(&self, key: &str) -> Result<Vec<String>> {
        let path = self.log_path(key);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(EhMetricsError::FileRead { path, source: e }),
        };
        let mut lines = BufReader::new(file).lines().collect::<std::io::Result<Vec<_>>>()?;
        lines.sort();
        Ok(lines)
    }

    /// Metric keys that have a log in this directory, sorted.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be listed.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if let Some(key) = entry.file_name().to_str().and_then(key_from_file_name) {
                keys.push(key.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Append-only writer for one metric's evidence lines.
#[derive(Debug)]
pub struct HitLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl HitLog {
    /// Append one evidence line. Embedded newlines are flattened so one hit
    /// always stays one line.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn write(&mut self, evidence: &str) -> Result<()> {
        if evidence.contains(['\n', '\r']) {
            let flat = evidence.replace(['\n', '\r'], " ");
            writeln!(self.writer, "{flat}")?;
        } else {
            writeln!(self.writer, "{evidence}")?;
        }
        Ok(())
    }

    /// Flush buffered lines to disk.
    ///
    /// # Errors
    /// Returns an error if the flush fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "hitlog_tests.rs"]
mod tests;
