//! Integration tests for the `report` command.

mod common;

use std::fs;

use common::{LOCAL_CONFIG, TestFixture};

fn read_points(path: &std::path::Path) -> Vec<serde_json::Value> {
    let content = fs::read_to_string(path).unwrap();
    let data: serde_json::Value = serde_json::from_str(&content).unwrap();
    data["points"].as_array().unwrap().clone()
}

fn record(fixture: &TestFixture, build: &str) {
    eh_metrics!()
        .current_dir(fixture.path())
        .args(["check", "--quiet", "--record", "--build-number", build])
        .assert()
        .success();
}

#[test]
fn report_lists_recorded_builds_oldest_first() {
    let fixture = TestFixture::git_repo();
    fixture.create_config(LOCAL_CONFIG);
    fixture.create_cache_user("Cache", 2);
    let first = fixture.commit_all("first");
    record(&fixture, "1");
    fixture.create_cache_user("Cache", 1);
    let second = fixture.commit_all("second");
    record(&fixture, "2");

    eh_metrics!()
        .current_dir(fixture.path())
        .args(["report", "-o", "report.json"])
        .assert()
        .success();

    let points = read_points(&fixture.path().join("report.json"));
    assert_eq!(points.len(), 2);
    assert_eq!(points[0]["endCommit"], first.as_str());
    assert_eq!(points[0]["build"], "1");
    assert_eq!(points[0]["values"]["jira.stats.usageof.CacheBuilder"]["value"], 2);
    assert_eq!(points[1]["endCommit"], second.as_str());
    assert_eq!(points[1]["values"]["jira.stats.usageof.CacheBuilder"]["value"], 1);
}

#[test]
fn report_honours_max_points_and_current() {
    let fixture = TestFixture::git_repo();
    fixture.create_config(LOCAL_CONFIG);
    fixture.create_cache_user("Cache", 3);
    fixture.commit_all("first");
    record(&fixture, "1");
    fixture.create_cache_user("Cache", 2);
    let second = fixture.commit_all("second");
    record(&fixture, "2");

    eh_metrics!()
        .current_dir(fixture.path())
        .args(["report", "--quiet", "--max-points", "2", "--current"])
        .assert()
        .success();

    let points = read_points(&fixture.state_dir().join("report-data.json"));
    assert_eq!(points.len(), 2);
    assert_eq!(points[0]["endCommit"], second.as_str());
    assert_eq!(points[1]["build"], "current");
    assert_eq!(points[1]["values"]["jira.stats.usageof.CacheBuilder"]["value"], 2);
    assert!(points[1]["date"].is_i64());

    eh_metrics!()
        .current_dir(fixture.path())
        .args(["report", "--quiet", "--max-points", "1", "--current"])
        .assert()
        .success();

    let points = read_points(&fixture.state_dir().join("report-data.json"));
    assert_eq!(points.len(), 1);
    assert_eq!(points[0]["build"], "current");
}

#[test]
fn report_without_history_is_empty() {
    let fixture = TestFixture::git_repo();
    fixture.create_config(LOCAL_CONFIG);
    fixture.commit_all("initial");

    eh_metrics!()
        .current_dir(fixture.path())
        .args(["report", "-o", "report.json"])
        .assert()
        .success();

    assert!(read_points(&fixture.path().join("report.json")).is_empty());
}
