use std::path::PathBuf;

use super::*;
use crate::collector::{CollectorCore, FileCountCollector, FileFilter, GrepCollector, Predicate};

struct EmptySource;

impl ModuleSource for EmptySource {
    fn measured_modules(&self) -> Result<Vec<Module>> {
        Ok(Vec::new())
    }

    fn files<'a>(&'a self, _module: &Module) -> Result<Box<dyn Iterator<Item = SourceFile> + 'a>> {
        Ok(Box::new(std::iter::empty()))
    }

    fn open_file(&self, _file: &SourceFile) -> Result<Option<Box<dyn BufRead>>> {
        Ok(None)
    }
}

fn grep(key: &str) -> Box<dyn Collector> {
    Box::new(GrepCollector::new(
        CollectorCore::falling(key, "grep"),
        FileFilter::default(),
        Predicate::literal("x"),
    ))
}

fn set(name: &str, collectors: Vec<Box<dyn Collector>>) -> ModuleSet {
    ModuleSet::new(name, Box::new(EmptySource), collectors)
}

#[test]
fn distinct_keys_are_valid() {
    let sets = vec![
        set("source", vec![grep("a"), grep("b")]),
        set("tests", vec![grep("c")]),
    ];
    assert!(validate_module_sets(&sets).is_ok());
}

#[test]
fn duplicate_key_across_sets_is_rejected() {
    let sets = vec![set("source", vec![grep("a")]), set("tests", vec![grep("a")])];

    let err = validate_module_sets(&sets).unwrap_err();

    match err {
        EhMetricsError::DuplicateMetricKey { key, first, second } => {
            assert_eq!(key, "a");
            assert_eq!(first, "source/a");
            assert_eq!(second, "tests/a");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn derived_key_clash_is_rejected() {
    let sets = vec![set(
        "source",
        vec![
            Box::new(FileCountCollector::new("jsp", "JSP", FileFilter::default())),
            grep("jsp.count"),
        ],
    )];
    assert!(matches!(
        validate_module_sets(&sets),
        Err(EhMetricsError::DuplicateMetricKey { .. })
    ));
}

#[test]
fn comma_in_key_is_rejected() {
    let sets = vec![set("source", vec![grep("a,b")])];
    assert!(matches!(
        validate_module_sets(&sets),
        Err(EhMetricsError::InvalidCollector { .. })
    ));
}

#[test]
fn metric_keys_flatten_collectors() {
    let set = set(
        "source",
        vec![
            grep("a"),
            Box::new(FileCountCollector::new("vm", "Velocity", FileFilter::default())),
        ],
    );
    assert_eq!(set.metric_keys(), vec!["a", "vm.count", "vm.cumulativesize"]);
}

#[test]
fn invalid_glob_is_reported() {
    let err = build_glob_set(&["ok/**".to_string(), "[unclosed".to_string()]).unwrap_err();
    assert!(matches!(err, EhMetricsError::InvalidPattern { pattern, .. } if pattern == "[unclosed"));
}

#[test]
fn display_name_uses_forward_slashes() {
    let root = PathBuf::from("project");
    let path = root.join("core").join("src").join("main").join("A.java");
    assert_eq!(display_name(&root, &path), "core/src/main/A.java");
    assert_eq!(display_name(&root, &root), ".");
}
