//! The scan phase: drives every collector over every module set and merges
//! their values into one snapshot.

use std::io::BufRead;

use crate::Result;
use crate::collector::Collector;
use crate::hitlog::HitLogDir;
use crate::module_set::{Module, ModuleSet, ModuleSource, validate_module_sets};
use crate::output::ScanProgress;
use crate::snapshot::Snapshot;

const LOG_TARGET: &str = "eh_metrics::engine";

/// Runs collectors over module sets.
#[derive(Debug, Clone)]
pub struct ScanEngine {
    prefix: String,
    logs: HitLogDir,
    filter: Option<String>,
    verbose: bool,
    quiet: bool,
}

impl ScanEngine {
    #[must_use]
    pub fn new(prefix: impl Into<String>, logs: HitLogDir) -> Self {
        Self {
            prefix: prefix.into(),
            logs,
            filter: None,
            verbose: false,
            quiet: true,
        }
    }

    /// Keep only collectors with a metric key containing `filter`.
    #[must_use]
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter.filter(|f| !f.is_empty());
        self
    }

    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Show a progress spinner (when attached to a terminal).
    #[must_use]
    pub const fn with_progress(mut self, show: bool) -> Self {
        self.quiet = !show;
        self
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Fully-qualified snapshot key for a collector metric key.
    #[must_use]
    pub fn qualify(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.prefix)
        }
    }

    /// Scan every set and return the merged snapshot.
    ///
    /// # Errors
    /// Returns an error if the collector configuration is invalid. Problems
    /// with individual sets, modules or files are logged and skipped.
    pub fn run(&self, sets: &mut [ModuleSet], build_number: Option<String>) -> Result<Snapshot> {
        validate_module_sets(sets)?;

        let progress = ScanProgress::spinner(self.quiet);
        let mut scanned = Vec::new();

        for (index, set) in sets.iter_mut().enumerate() {
            if let Some(filter) = &self.filter {
                set.collectors
                    .retain(|c| c.metric_keys().iter().any(|k| k.contains(filter.as_str())));
                if set.collectors.is_empty() {
                    log::info!(target: LOG_TARGET, "Skipping module set '{}': no collector matches '{filter}'", set.name);
                    continue;
                }
            }
            if let Err(e) = set.source.prepare_environment() {
                log::warn!(target: LOG_TARGET, "Skipping module set '{}': {e}", set.name);
                continue;
            }
            for collector in &mut set.collectors {
                collector.core_mut().configure(self.verbose);
            }
            progress.set_message(set.name.clone());
            self.scan_set(set, &progress);
            scanned.push(index);
        }
        progress.finish();

        let mut snapshot = Snapshot::new().with_build_number(build_number);
        for index in scanned {
            self.collect_values(&mut sets[index], &mut snapshot);
        }
        log::info!(target: LOG_TARGET, "Collected {} metrics from {} files", snapshot.len(), progress.count());
        Ok(snapshot)
    }

    fn scan_set(&self, set: &mut ModuleSet, progress: &ScanProgress) {
        let ModuleSet {
            name,
            source,
            collectors,
        } = set;

        let modules = match source.measured_modules() {
            Ok(modules) => modules,
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Cannot list modules of '{name}': {e}");
                return;
            }
        };
        log::debug!(target: LOG_TARGET, "Module set '{name}': {} modules", modules.len());

        for module in &modules {
            self.scan_module(&**source, collectors, module, progress);
        }
    }

    fn scan_module(
        &self,
        source: &dyn ModuleSource,
        collectors: &mut [Box<dyn Collector>],
        module: &Module,
        progress: &ScanProgress,
    ) {
        for collector in collectors.iter_mut().filter(|c| !c.is_lazy()) {
            self.open_logs(&mut **collector);
            collector.pre_files_scan(module);
        }

        match source.files(module) {
            Ok(files) => {
                for file in files {
                    progress.inc();
                    let interested: Vec<usize> = collectors
                        .iter_mut()
                        .enumerate()
                        .filter(|(_, c)| !c.is_lazy())
                        .filter_map(|(i, c)| c.wants_file(&file).then_some(i))
                        .collect();
                    if interested.is_empty() {
                        continue;
                    }
                    match source.open_file(&file) {
                        Ok(Some(reader)) => stream_lines(reader, collectors, interested, &file.name),
                        Ok(None) => {}
                        Err(e) => log::warn!(target: LOG_TARGET, "Skipping {}: {e}", file.name),
                    }
                }
            }
            Err(e) => log::warn!(target: LOG_TARGET, "Cannot list files of module {}: {e}", module.name),
        }

        for collector in collectors.iter_mut().filter(|c| !c.is_lazy()) {
            collector.post_files_scan(module);
            collector.core_mut().close_logs();
        }
    }

    fn open_logs(&self, collector: &mut dyn Collector) {
        let keys = collector.metric_keys();
        if let Err(e) = collector.core_mut().open_logs(&self.logs, &keys) {
            log::warn!(target: LOG_TARGET, "Hit logs unavailable for {}: {e}", collector.core().key());
        }
    }

    fn collect_values(&self, set: &mut ModuleSet, snapshot: &mut Snapshot) {
        for collector in &mut set.collectors {
            let lazy = collector.is_lazy();
            if lazy {
                self.open_logs(&mut **collector);
            }
            for (key, result) in collector.get_values() {
                snapshot.insert(self.qualify(&key), result);
            }
            if lazy {
                collector.core_mut().close_logs();
            }
        }
    }
}

/// Feed lines to the collectors at `reading` until all release the file or
/// it ends.
fn stream_lines(
    mut reader: Box<dyn BufRead>,
    collectors: &mut [Box<dyn Collector>],
    mut reading: Vec<usize>,
    name: &str,
) {
    let mut buf = Vec::new();
    while !reading.is_empty() {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Stopped reading {name}: {e}");
                break;
            }
        }
        let text = String::from_utf8_lossy(&buf);
        let line = text.trim_end_matches(['\n', '\r']);
        reading.retain(|&i| collectors[i].on_read_line(line));
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
