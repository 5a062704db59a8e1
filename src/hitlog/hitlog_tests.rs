use std::fs;

use tempfile::TempDir;

use super::*;

#[test]
fn file_name_follows_naming_pattern() {
    assert_eq!(
        file_name("usageof.CacheBuilder"),
        "eh-metrics-hit-for-usageof.CacheBuilder.log"
    );
    assert_eq!(
        key_from_file_name("eh-metrics-hit-for-jsp.count.log"),
        Some("jsp.count")
    );
    assert_eq!(key_from_file_name(".commit"), None);
}

#[test]
fn create_writes_commit_marker() {
    let tmp = TempDir::new().unwrap();
    let logs = HitLogDir::create(tmp.path().join("logs"), Some("abc123")).unwrap();

    assert_eq!(logs.commit().as_deref(), Some("abc123"));
}

#[test]
fn create_removes_previous_run_logs_only() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("logs");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file_name("old")), "stale\n").unwrap();
    fs::write(dir.join("notes.txt"), "keep").unwrap();

    let logs = HitLogDir::create(&dir, None).unwrap();

    assert!(!logs.log_path("old").exists());
    assert!(dir.join("notes.txt").exists());
    assert!(logs.commit().is_none());
}

#[test]
fn reopening_appends() {
    let tmp = TempDir::new().unwrap();
    let logs = HitLogDir::create(tmp.path(), None).unwrap();

    {
        let mut log = logs.open("metric").unwrap();
        log.write("module-a: hit").unwrap();
        log.flush().unwrap();
    }
    {
        let mut log = logs.open("metric").unwrap();
        log.write("module-b: hit").unwrap();
    }

    let content = fs::read_to_string(logs.log_path("metric")).unwrap();
    assert_eq!(content, "module-a: hit\nmodule-b: hit\n");
}

#[test]
fn read_sorted_sorts_lines() {
    let tmp = TempDir::new().unwrap();
    let logs = HitLogDir::at(tmp.path());
    fs::write(logs.log_path("metric"), "b\na\nc\na\n").unwrap();

    assert_eq!(logs.read_sorted("metric").unwrap(), vec!["a", "a", "b", "c"]);
}

#[test]
fn read_sorted_missing_log_is_empty() {
    let tmp = TempDir::new().unwrap();
    let logs = HitLogDir::at(tmp.path());

    assert!(logs.read_sorted("absent").unwrap().is_empty());
}

#[test]
fn multi_line_evidence_stays_on_one_line() {
    let tmp = TempDir::new().unwrap();
    let logs = HitLogDir::create(tmp.path(), None).unwrap();

    let mut log = logs.open("metric").unwrap();
    log.write("first\nsecond").unwrap();
    log.flush().unwrap();

    assert_eq!(logs.read_sorted("metric").unwrap(), vec!["first second"]);
}

#[test]
fn keys_lists_logged_metrics() {
    let tmp = TempDir::new().unwrap();
    let logs = HitLogDir::create(tmp.path(), Some("c0ffee")).unwrap();
    logs.open("b.metric").unwrap();
    logs.open("a.metric").unwrap();

    assert_eq!(logs.keys().unwrap(), vec!["a.metric", "b.metric"]);
}
