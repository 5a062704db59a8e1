use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::catalog;
use crate::cli::{Cli, ColorChoice, ScanOptions};
use crate::config::{Config, ConfigLoader, FileConfigLoader};
use crate::engine::ScanEngine;
use crate::git::GitContext;
use crate::hitlog::HitLogDir;
use crate::ledger::GitNotesLedger;
use crate::output::ColorMode;
use crate::snapshot::Snapshot;
use crate::state;

pub(crate) const LOG_TARGET: &str = "eh_metrics::commands";

#[must_use]
pub const fn color_choice_to_mode(choice: ColorChoice) -> ColorMode {
    match choice {
        ColorChoice::Auto => ColorMode::Auto,
        ColorChoice::Always => ColorMode::Always,
        ColorChoice::Never => ColorMode::Never,
    }
}

/// Load configuration for `project_root`.
///
/// An explicit `config_path` wins over discovery; `no_config` skips both.
///
/// # Errors
/// Returns an error if the selected file cannot be read or parsed.
pub fn load_config(config_path: Option<&Path>, no_config: bool, project_root: &Path) -> crate::Result<Config> {
    if no_config {
        return Ok(Config::default());
    }

    let loader = FileConfigLoader::with_project_root(project_root.to_path_buf());
    config_path.map_or_else(|| loader.load(), |path| loader.load_from_path(path))
}

/// Hit log directory of this project: configured, or inside the state dir.
#[must_use]
pub fn hit_log_dir(project_root: &Path, config: &Config) -> PathBuf {
    match &config.metrics.log_dir {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => project_root.join(dir),
        None => state::hit_log_dir(project_root),
    }
}

/// Everything a command needs about the project it runs on.
#[derive(Debug)]
pub struct ProjectContext {
    pub root: PathBuf,
    pub config: Config,
    pub git: Option<GitContext>,
}

impl ProjectContext {
    /// Discover the project root above `path` and load its configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn load(path: &Path, config_path: Option<&Path>, no_config: bool) -> crate::Result<Self> {
        let root = state::discover_project_root(path);
        let config = load_config(config_path, no_config, &root)?;
        let git = GitContext::from_path(&root);
        log::debug!(target: LOG_TARGET, "Project root {}", root.display());
        Ok(Self { root, config, git })
    }

    #[must_use]
    pub fn commit(&self) -> Option<&str> {
        self.git.as_ref().map(|g| g.commit.as_str())
    }

    #[must_use]
    pub fn ledger(&self) -> GitNotesLedger {
        GitNotesLedger::new(&self.root, self.config.ledger.remote.clone())
    }

    #[must_use]
    pub fn hit_logs(&self) -> HitLogDir {
        HitLogDir::at(hit_log_dir(&self.root, &self.config))
    }

    /// Run every enabled module set and return the snapshot.
    ///
    /// # Errors
    /// Returns an error if the catalog is misconfigured or the hit log
    /// directory cannot be prepared.
    pub fn scan(&self, options: &ScanOptions, cli: &Cli) -> crate::Result<Snapshot> {
        let logs = HitLogDir::create(hit_log_dir(&self.root, &self.config), self.commit())?;
        let mut sets = catalog::default_module_sets(&self.root, &self.config, self.commit())?;
        let engine = ScanEngine::new(&self.config.metrics.prefix, logs)
            .with_filter(options.filter.clone())
            .with_verbose(cli.verbose >= 2)
            .with_progress(!cli.quiet);
        engine.run(&mut sets, options.build_number.clone())
    }
}

/// Write to a file, or to stdout unless quiet.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_output(output_path: Option<&Path>, content: &str, quiet: bool) -> crate::Result<()> {
    if let Some(path) = output_path {
        state::ensure_parent_dir(path)?;
        fs::write(path, content)?;
    } else if !quiet {
        let mut stdout = io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        if !content.ends_with('\n') {
            writeln!(stdout)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
