use std::fs;

use tempfile::TempDir;

use super::*;

fn git(dir: &Path, args: &[&str]) -> String {
    let output = git_cmd().arg("-C").arg(dir).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "git {args:?}: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn commit_file(dir: &Path, name: &str, content: &str) -> String {
    fs::write(dir.join(name), content).unwrap();
    git(dir, &["add", name]);
    git(dir, &["commit", "--quiet", "-m", name]);
    git(dir, &["rev-parse", "HEAD"])
}

fn repo() -> TempDir {
    let tmp = TempDir::new().unwrap();
    git(tmp.path(), &["init", "--quiet"]);
    git(tmp.path(), &["config", "user.name", "Dev"]);
    git(tmp.path(), &["config", "user.email", "dev@example.com"]);
    git(tmp.path(), &["config", "commit.gpgsign", "false"]);
    tmp
}

#[test]
fn full_ref_prefixes_bare_names() {
    assert_eq!(full_ref("eh-metrics"), "refs/notes/eh-metrics");
    assert_eq!(full_ref("refs/notes/x"), "refs/notes/x");
}

#[test]
fn parse_record_skips_commits_without_note() {
    assert_eq!(parse_record("abc\u{1f}Dev <d@e>\u{1f}100\u{1f}\n"), None);
    let parsed = parse_record("\nabc\u{1f}Dev <d@e>\u{1f}100\u{1f}{\"a\":1}\n\n").unwrap();
    assert_eq!(parsed.hash, "abc");
    assert_eq!(parsed.committer, "Dev <d@e>");
    assert_eq!(parsed.timestamp, 100);
    assert_eq!(parsed.note, "{\"a\":1}");
}

#[test]
fn notes_round_trip_newest_first() {
    let tmp = repo();
    let ledger = GitNotesLedger::new(tmp.path(), None);
    let first = commit_file(tmp.path(), "a.txt", "a");
    ledger.put_note("metrics", &first, "{\"n\":1}", false).unwrap();
    let _unannotated = commit_file(tmp.path(), "b.txt", "b");
    let third = commit_file(tmp.path(), "c.txt", "c");
    ledger.put_note("metrics", &third, "{\"n\":3}", false).unwrap();

    let newest = ledger
        .annotated_commits("metrics", None, HistoryOrder::NewestFirst, None)
        .unwrap();
    assert_eq!(
        newest.iter().map(|c| c.hash.as_str()).collect::<Vec<_>>(),
        vec![third.as_str(), first.as_str()]
    );
    assert_eq!(newest[0].committer, "Dev <dev@example.com>");

    let latest = ledger.latest_annotated("metrics").unwrap().unwrap();
    assert_eq!(latest.note, "{\"n\":3}");
    assert!(ledger.latest_annotated("other").unwrap().is_none());
}

#[test]
fn since_includes_the_starting_commit() {
    let tmp = repo();
    let ledger = GitNotesLedger::new(tmp.path(), None);
    let before = commit_file(tmp.path(), "a.txt", "a");
    ledger.put_note("excl", &before, "old", false).unwrap();
    let start = commit_file(tmp.path(), "b.txt", "b");
    ledger.put_note("excl", &start, "start", false).unwrap();
    let after = commit_file(tmp.path(), "c.txt", "c");
    ledger.put_note("excl", &after, "after", false).unwrap();

    let notes: Vec<String> = ledger
        .annotated_commits("excl", Some(&start), HistoryOrder::OldestFirst, None)
        .unwrap()
        .into_iter()
        .map(|c| c.note)
        .collect();

    assert_eq!(notes, vec!["start", "after"]);
}

#[test]
fn put_without_force_refuses_overwrite() {
    let tmp = repo();
    let ledger = GitNotesLedger::new(tmp.path(), None);
    let head = commit_file(tmp.path(), "a.txt", "a");
    ledger.put_note("metrics", &head, "one", false).unwrap();

    assert!(ledger.put_note("metrics", &head, "two", false).is_err());
    ledger.put_note("metrics", &head, "two", true).unwrap();
    assert_eq!(ledger.latest_annotated("metrics").unwrap().unwrap().note, "two");
}

#[test]
fn workspace_and_identity() {
    let tmp = repo();
    let ledger = GitNotesLedger::new(tmp.path(), None);
    let head = commit_file(tmp.path(), "a.txt", "a");

    assert_eq!(ledger.current_commit().unwrap(), head);
    assert!(ledger.is_clean_workspace().unwrap());
    assert_eq!(ledger.committer().unwrap(), "Dev <dev@example.com>");

    fs::write(tmp.path().join("a.txt"), "changed").unwrap();
    assert!(!ledger.is_clean_workspace().unwrap());
}

#[test]
fn without_remote_fetch_is_noop() {
    let tmp = repo();
    commit_file(tmp.path(), "a.txt", "a");
    let ledger = GitNotesLedger::new(tmp.path(), Some(String::new()));

    assert!(!ledger.fetch_notes("metrics").unwrap());
    ledger.push_notes("metrics").unwrap();
}

#[test]
fn empty_repository_has_no_history() {
    let tmp = repo();
    let ledger = GitNotesLedger::new(tmp.path(), None);

    assert!(ledger.latest_annotated("metrics").unwrap().is_none());
    assert!(ledger.current_commit().is_err());
}

#[test]
fn history_outside_a_repository_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let ledger = GitNotesLedger::new(tmp.path(), None);

    assert!(ledger.annotated_commits("metrics", None, HistoryOrder::NewestFirst, None).is_err());
}

#[test]
fn notes_travel_through_a_remote() {
    let bare = TempDir::new().unwrap();
    git(bare.path(), &["init", "--bare", "--quiet"]);
    let bare_path = bare.path().to_string_lossy().into_owned();

    let work = repo();
    let head = commit_file(work.path(), "a.txt", "a");
    let branch = git(work.path(), &["rev-parse", "--abbrev-ref", "HEAD"]);
    git(work.path(), &["remote", "add", "origin", &bare_path]);
    git(work.path(), &["push", "--quiet", "origin", &format!("HEAD:refs/heads/{branch}")]);
    git(bare.path(), &["symbolic-ref", "HEAD", &format!("refs/heads/{branch}")]);

    let ledger = GitNotesLedger::new(work.path(), Some("origin".to_string()));
    ledger.put_note("metrics", &head, "{\"x\":1}", true).unwrap();
    ledger.push_notes("metrics").unwrap();

    let parent = TempDir::new().unwrap();
    git(parent.path(), &["clone", "--quiet", &bare_path, "copy"]);
    let copy = parent.path().join("copy");
    let copy_ledger = GitNotesLedger::new(&copy, Some("origin".to_string()));
    assert!(copy_ledger.latest_annotated("metrics").unwrap().is_none());

    assert!(copy_ledger.fetch_notes("metrics").unwrap());
    let latest = copy_ledger.latest_annotated("metrics").unwrap().unwrap();
    assert_eq!(latest.hash, head);
    assert_eq!(latest.note, "{\"x\":1}");
}
