//! Module sets: where the scanned files come from and which collectors see
//! them.

mod archive;
mod directory;

pub use archive::PluginArchives;
pub use directory::DirectoryTree;

use std::io::BufRead;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use indexmap::IndexMap;

use crate::collector::Collector;
use crate::{EhMetricsError, Result};

/// A measured unit: a source module directory or a packaged archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Display name, relative to the project root with `/` separators.
    pub name: String,
    pub path: PathBuf,
}

impl Module {
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileLocation {
    Disk(PathBuf),
    ArchiveEntry { archive: PathBuf, entry: String },
}

/// A file offered to collectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Display name used for filtering and evidence (`/` separated).
    pub name: String,
    pub size: u64,
    pub location: FileLocation,
}

/// Enumerates modules and files, and opens their content.
pub trait ModuleSource {
    /// Expensive precondition run once before scanning.
    ///
    /// # Errors
    /// Returns an error if the environment cannot be prepared; the engine
    /// skips the set.
    fn prepare_environment(&mut self) -> Result<()> {
        Ok(())
    }

    /// # Errors
    /// Returns an error if modules cannot be discovered.
    fn measured_modules(&self) -> Result<Vec<Module>>;

    /// Files belonging to `module`, in a deterministic order.
    ///
    /// # Errors
    /// Returns an error if the module cannot be listed.
    fn files<'a>(&'a self, module: &Module) -> Result<Box<dyn Iterator<Item = SourceFile> + 'a>>;

    /// Open a file's content, or `None` when only its name and size matter.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    fn open_file(&self, file: &SourceFile) -> Result<Option<Box<dyn BufRead>>>;
}

/// A named source together with the collectors applied to it.
pub struct ModuleSet {
    pub name: String,
    pub source: Box<dyn ModuleSource>,
    pub collectors: Vec<Box<dyn Collector>>,
}

impl ModuleSet {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        source: Box<dyn ModuleSource>,
        collectors: Vec<Box<dyn Collector>>,
    ) -> Self {
        Self {
            name: name.into(),
            source,
            collectors,
        }
    }

    /// Every metric key declared by this set's collectors.
    #[must_use]
    pub fn metric_keys(&self) -> Vec<String> {
        self.collectors.iter().flat_map(|c| c.metric_keys()).collect()
    }
}

impl std::fmt::Debug for ModuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleSet")
            .field("name", &self.name)
            .field("metric_keys", &self.metric_keys())
            .finish_non_exhaustive()
    }
}

/// Reject collector configurations a snapshot cannot represent: invalid
/// identities, comma-bearing keys, and keys declared twice.
///
/// # Errors
/// Returns the first configuration error found.
pub fn validate_module_sets(sets: &[ModuleSet]) -> Result<()> {
    let mut owners: IndexMap<String, String> = IndexMap::new();
    for set in sets {
        for collector in &set.collectors {
            collector.core().validate()?;
            for key in collector.metric_keys() {
                if key.contains(',') {
                    return Err(EhMetricsError::InvalidCollector {
                        key,
                        reason: "key must not contain ','".to_string(),
                    });
                }
                let owner = format!("{}/{}", set.name, collector.core().key());
                if let Some(first) = owners.get(&key) {
                    return Err(EhMetricsError::DuplicateMetricKey {
                        key,
                        first: first.clone(),
                        second: owner,
                    });
                }
                owners.insert(key, owner);
            }
        }
    }
    Ok(())
}

/// Compile glob patterns into one set.
///
/// # Errors
/// Returns an error naming the first invalid pattern.
pub fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| EhMetricsError::InvalidPattern {
            pattern: pattern.clone(),
            source: e,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| EhMetricsError::InvalidPattern {
        pattern: "combined patterns".to_string(),
        source: e,
    })
}

/// `path` relative to `root` with `/` separators.
#[must_use]
pub fn display_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
