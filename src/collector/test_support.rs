//! Drivers running collectors over in-memory files.

use std::path::PathBuf;

use super::Collector;
use crate::module_set::{FileLocation, Module, SourceFile};

pub fn source_file(name: &str) -> SourceFile {
    SourceFile {
        name: name.to_string(),
        size: 0,
        location: FileLocation::Disk(PathBuf::from(name)),
    }
}

pub fn module(name: &str) -> Module {
    Module::new(name, PathBuf::from(name))
}

/// Offer one file and stream its lines until the collector releases it.
/// Returns how many lines were consumed.
pub fn feed(collector: &mut dyn Collector, name: &str, lines: &[&str]) -> usize {
    if !collector.wants_file(&source_file(name)) {
        return 0;
    }
    let mut consumed = 0;
    for line in lines {
        consumed += 1;
        if !collector.on_read_line(line) {
            break;
        }
    }
    consumed
}

/// Run one module bracket over `files`.
pub fn scan_module(collector: &mut dyn Collector, module_name: &str, files: &[(&str, &[&str])]) {
    let module = module(module_name);
    collector.pre_files_scan(&module);
    for (name, lines) in files {
        feed(collector, name, lines);
    }
    collector.post_files_scan(&module);
}
