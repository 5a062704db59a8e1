use tempfile::TempDir;

use super::*;
use crate::collector::test_support::feed;
use crate::hitlog::HitLogDir;

fn grep(target: &str) -> GrepCollector {
    GrepCollector::new(
        CollectorCore::falling("grep", "grep test"),
        FileFilter::default(),
        Predicate::literal(target),
    )
}

#[test]
fn counts_every_matching_line() {
    let mut collector = grep("ism");

    feed(
        &mut collector,
        "words.txt",
        &["buddhism", "ismypizzaready?", "kissme", "mismatch"],
    );

    assert_eq!(collector.core().value(), 3);
}

#[test]
fn scope_limits_counting_to_context() {
    let mut collector = grep("1").within(ScopeActivator::new(
        Predicate::literal("<context>"),
        Predicate::literal("</context>"),
    ));

    feed(
        &mut collector,
        "scoped.txt",
        &[
            "sad 1 sad ",
            "sad 1 sad <context>",
            "sad 1 sad ",
            "sad 2 sad ",
            "sad 1 sad <context> sad 2 sad ",
            "sad 1 sad </context> sad 1 sad",
        ],
    );

    assert_eq!(collector.core().value(), 3);
}

#[test]
fn scope_resets_between_files() {
    let mut collector = grep("x").within(ScopeActivator::new(
        Predicate::literal("<s>"),
        Predicate::literal("</s>"),
    ));

    feed(&mut collector, "a.txt", &["<s>"]);
    feed(&mut collector, "b.txt", &["x"]);

    assert_eq!(collector.core().value(), 0);
}

#[test]
fn filter_rejects_other_files() {
    let mut collector = GrepCollector::new(
        CollectorCore::falling("css", "important"),
        FileFilter::suffixes([".css", ".less"]),
        Predicate::literal("!important"),
    );

    assert_eq!(feed(&mut collector, "Main.java", &["!important"]), 0);
    feed(&mut collector, "web/style.less", &["a { color: red !important; }"]);

    assert_eq!(collector.core().value(), 1);
}

#[test]
fn stop_predicate_releases_file() {
    let mut collector = grep("TODO").stop_at(Predicate::literal("__END__"));

    let consumed = feed(&mut collector, "f.txt", &["TODO a", "__END__", "TODO b"]);

    assert_eq!(consumed, 2);
    assert_eq!(collector.core().value(), 1);
}

#[test]
fn hits_are_logged_with_file_name() {
    let tmp = TempDir::new().unwrap();
    let logs = HitLogDir::create(tmp.path(), None).unwrap();
    let mut collector = grep("CacheBuilder");

    collector.core_mut().open_logs(&logs, &["grep".to_string()]).unwrap();
    feed(&mut collector, "core/Foo.java", &["    CacheBuilder.newBuilder()"]);
    collector.core_mut().close_logs();

    assert_eq!(
        logs.read_sorted("grep").unwrap(),
        vec!["core/Foo.java: CacheBuilder.newBuilder()"]
    );
}
