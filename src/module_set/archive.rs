use std::fs::{self, File};
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

use globset::GlobSet;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;
use zip::ZipArchive;

use super::{FileLocation, Module, ModuleSource, SourceFile, build_glob_set, display_name};
use crate::{EhMetricsError, Result, shell};

const LOG_TARGET: &str = "eh_metrics::module_set";

const ARCHIVE_EXTENSIONS: &[&str] = &["jar", "obr"];
const MANIFEST: &str = "META-INF/MANIFEST.MF";

/// Modules are packaged plugin archives; files are their descriptor,
/// manifest and other XML entries.
#[derive(Debug)]
pub struct PluginArchives {
    root: PathBuf,
    archives: GlobSet,
    exclude: GlobSet,
    package_command: Option<String>,
    commit: Option<String>,
    marker: PathBuf,
}

impl PluginArchives {
    /// # Errors
    /// Returns an error if a glob pattern is invalid.
    pub fn new(root: impl Into<PathBuf>, archives: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            root: root.into(),
            archives: build_glob_set(archives)?,
            exclude: build_glob_set(exclude)?,
            package_command: None,
            commit: None,
            marker: PathBuf::new(),
        })
    }

    /// Build the archives with `command` before scanning, unless `marker`
    /// shows they were already built from `commit` with the same command.
    #[must_use]
    pub fn with_packaging(mut self, command: impl Into<String>, commit: Option<String>, marker: impl Into<PathBuf>) -> Self {
        self.package_command = Some(command.into());
        self.commit = commit;
        self.marker = marker.into();
        self
    }

    fn fingerprint(&self, command: &str) -> Option<String> {
        let commit = self.commit.as_deref()?;
        let mut hasher = Sha256::new();
        hasher.update(commit.as_bytes());
        hasher.update(b"\n");
        hasher.update(command.as_bytes());
        Some(format!("{:x}", hasher.finalize()))
    }

    fn is_fresh(&self, fingerprint: Option<&str>) -> bool {
        let Some(fingerprint) = fingerprint else {
            return false;
        };
        fs::read_to_string(&self.marker).is_ok_and(|stored| stored.trim() == fingerprint)
    }

    fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
        let file = File::open(path).map_err(|e| EhMetricsError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        ZipArchive::new(BufReader::new(file)).map_err(|source| EhMetricsError::Archive {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn is_scanned_entry(name: &str) -> bool {
    name == MANIFEST || name.ends_with(".xml")
}

impl ModuleSource for PluginArchives {
    fn prepare_environment(&mut self) -> Result<()> {
        let Some(command) = self.package_command.clone() else {
            return Ok(());
        };
        let fingerprint = self.fingerprint(&command);
        if self.is_fresh(fingerprint.as_deref()) {
            log::info!(target: LOG_TARGET, "Plugin archives are up to date, skipping `{command}`");
            return Ok(());
        }

        log::info!(target: LOG_TARGET, "Packaging plugins with `{command}`");
        shell::run(&command, &self.root)?;

        if let Some(fingerprint) = fingerprint {
            crate::state::ensure_parent_dir(&self.marker)?;
            fs::write(&self.marker, fingerprint)?;
        }
        Ok(())
    }

    fn measured_modules(&self) -> Result<Vec<Module>> {
        let modules = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !(e.file_name().to_string_lossy().starts_with('.')
                        || e.file_name() == "node_modules")
            })
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ARCHIVE_EXTENSIONS.contains(&ext))
            })
            .filter_map(|e| {
                let name = display_name(&self.root, e.path());
                (self.archives.is_match(&name) && !self.exclude.is_match(&name))
                    .then(|| Module::new(name, e.into_path()))
            })
            .collect();
        Ok(modules)
    }

    fn files<'a>(&'a self, module: &Module) -> Result<Box<dyn Iterator<Item = SourceFile> + 'a>> {
        let mut archive = Self::open_archive(&module.path)?;
        let mut files = Vec::new();
        for index in 0..archive.len() {
            let entry = archive.by_index(index).map_err(|source| EhMetricsError::Archive {
                path: module.path.clone(),
                source,
            })?;
            if entry.is_dir() || !is_scanned_entry(entry.name()) {
                continue;
            }
            files.push(SourceFile {
                name: format!("{}!{}", module.name, entry.name()),
                size: entry.size(),
                location: FileLocation::ArchiveEntry {
                    archive: module.path.clone(),
                    entry: entry.name().to_string(),
                },
            });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Box::new(files.into_iter()))
    }

    fn open_file(&self, file: &SourceFile) -> Result<Option<Box<dyn BufRead>>> {
        let FileLocation::ArchiveEntry { archive, entry } = &file.location else {
            return Ok(None);
        };
        let mut zip = Self::open_archive(archive)?;
        let mut content = Vec::new();
        zip.by_name(entry)
            .map_err(|source| EhMetricsError::Archive {
                path: archive.clone(),
                source,
            })?
            .read_to_end(&mut content)?;
        Ok(Some(Box::new(Cursor::new(content))))
    }
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;
