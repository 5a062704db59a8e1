use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use globset::GlobSet;
use walkdir::{DirEntry, WalkDir};

use super::{FileLocation, Module, ModuleSource, SourceFile, build_glob_set, display_name};
use crate::{EhMetricsError, Result};

const MAIN_DIR: &str = "src/main";
const TEST_DIR: &str = "src/test";

const SKIPPED_DIRS: &[&str] = &["target", "node_modules", "src"];

/// Only counted by size, never read.
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "gif", "jpg", "jpeg", "ico", "bmp", "jar", "zip", "class", "woff", "woff2", "ttf",
    "eot", "swf", "pdf",
];

/// Modules are directories holding a `src/main` (or `src/test`) tree.
#[derive(Debug)]
pub struct DirectoryTree {
    root: PathBuf,
    code_dir: &'static str,
    exclude: GlobSet,
    max_depth: usize,
}

impl DirectoryTree {
    /// Production sources under every module's `src/main`.
    ///
    /// # Errors
    /// Returns an error if an exclude pattern is invalid.
    pub fn sources(root: impl Into<PathBuf>, exclude: &[String], max_depth: usize) -> Result<Self> {
        Self::new(root.into(), MAIN_DIR, exclude, max_depth)
    }

    /// Test sources under every module's `src/test`.
    ///
    /// # Errors
    /// Returns an error if an exclude pattern is invalid.
    pub fn tests(root: impl Into<PathBuf>, exclude: &[String], max_depth: usize) -> Result<Self> {
        Self::new(root.into(), TEST_DIR, exclude, max_depth)
    }

    fn new(root: PathBuf, code_dir: &'static str, exclude: &[String], max_depth: usize) -> Result<Self> {
        Ok(Self {
            root,
            code_dir,
            exclude: build_glob_set(exclude)?,
            max_depth,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.exclude.is_match(display_name(&self.root, path))
    }

    fn descend_into(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }
        if !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        !name.starts_with('.')
            && !SKIPPED_DIRS.contains(&name.as_ref())
            && !self.is_excluded(entry.path())
    }
}

fn is_binary(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| BINARY_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

impl ModuleSource for DirectoryTree {
    fn measured_modules(&self) -> Result<Vec<Module>> {
        if !self.root.is_dir() {
            return Err(EhMetricsError::FileRead {
                path: self.root.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "project root is not a directory"),
            });
        }
        let modules = WalkDir::new(&self.root)
            .max_depth(self.max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.descend_into(e))
            .filter_map(std::result::Result::ok)
            .filter(|e| e.path().join(self.code_dir).is_dir())
            .map(|e| Module::new(display_name(&self.root, e.path()), e.into_path()))
            .collect();
        Ok(modules)
    }

    fn files<'a>(&'a self, module: &Module) -> Result<Box<dyn Iterator<Item = SourceFile> + 'a>> {
        let files = WalkDir::new(module.path.join(self.code_dir))
            .sort_by_file_name()
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(move |e| !self.is_excluded(e.path()))
            .map(move |e| SourceFile {
                name: display_name(&self.root, e.path()),
                size: e.metadata().map(|m| m.len()).unwrap_or(0),
                location: FileLocation::Disk(e.into_path()),
            });
        Ok(Box::new(files))
    }

    fn open_file(&self, file: &SourceFile) -> Result<Option<Box<dyn BufRead>>> {
        let FileLocation::Disk(path) = &file.location else {
            return Ok(None);
        };
        if is_binary(path) {
            return Ok(None);
        }
        let handle = File::open(path).map_err(|e| EhMetricsError::FileRead {
            path: path.clone(),
            source: e,
        })?;
        Ok(Some(Box::new(BufReader::new(handle))))
    }
}

#[cfg(test)]
#[path = "directory_tests.rs"]
mod tests;
