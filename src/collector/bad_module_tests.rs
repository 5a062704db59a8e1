use tempfile::TempDir;

use super::*;
use crate::collector::test_support::scan_module;
use crate::hitlog::HitLogDir;

fn collector() -> BadModuleCollector {
    BadModuleCollector::new(
        CollectorCore::falling("plugins.not.transformerless", "plugins needing transformation"),
        FileFilter::suffixes(["META-INF/MANIFEST.MF"]),
        Predicate::literal("Atlassian-Plugin-Key:"),
    )
}

const GOOD: &[&str] = &["Manifest-Version: 1.0", "Atlassian-Plugin-Key: com.example.good"];
const BAD: &[&str] = &["Manifest-Version: 1.0", "Created-By: Maven"];

#[test]
fn module_with_proof_is_not_counted() {
    let mut collector = collector();
    scan_module(&mut collector, "good.jar", &[("good.jar!META-INF/MANIFEST.MF", GOOD)]);
    assert_eq!(collector.core().value(), 0);
}

#[test]
fn module_without_proof_is_counted() {
    let mut collector = collector();
    scan_module(&mut collector, "bad.jar", &[("bad.jar!META-INF/MANIFEST.MF", BAD)]);
    assert_eq!(collector.core().value(), 1);
}

#[test]
fn module_without_matching_files_is_counted() {
    let mut collector = collector();
    scan_module(&mut collector, "empty.jar", &[("empty.jar!atlassian-plugin.xml", GOOD)]);
    assert_eq!(collector.core().value(), 1);
}

#[test]
fn verdicts_accumulate_across_modules() {
    let mut collector = collector();
    scan_module(&mut collector, "a.jar", &[("a.jar!META-INF/MANIFEST.MF", BAD)]);
    scan_module(&mut collector, "b.jar", &[("b.jar!META-INF/MANIFEST.MF", GOOD)]);
    scan_module(&mut collector, "c.jar", &[("c.jar!META-INF/MANIFEST.MF", BAD)]);
    assert_eq!(collector.core().value(), 2);
}

#[test]
fn bad_modules_are_logged_by_name() {
    let tmp = TempDir::new().unwrap();
    let logs = HitLogDir::create(tmp.path(), None).unwrap();
    let mut collector = collector();
    let keys = collector.metric_keys();

    collector.core_mut().open_logs(&logs, &keys).unwrap();
    scan_module(&mut collector, "plugins/bad.jar", &[("plugins/bad.jar!META-INF/MANIFEST.MF", BAD)]);
    scan_module(&mut collector, "plugins/good.jar", &[("plugins/good.jar!META-INF/MANIFEST.MF", GOOD)]);
    collector.core_mut().close_logs();

    assert_eq!(
        logs.read_sorted("plugins.not.transformerless").unwrap(),
        vec!["plugins/bad.jar"]
    );
}
