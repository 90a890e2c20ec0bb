//! End-to-end synchronization scenarios over real directory trees

use sentry_core::{
    ConfigStore, CopyService, Journal, Poller, PollerEvent, PostCopyService, RuleStatus,
    RulesService, SystemClock, SystemProcessRunner, WatchRule,
};
use sentry_fs::path::{destination_dir, destination_file};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

struct World {
    poller: Poller,
    rules: Arc<RulesService>,
    journal: Arc<Journal>,
    _temp: tempfile::TempDir,
    dir: PathBuf,
}

fn world() -> World {
    let temp = tempfile::tempdir().unwrap();
    let dir = temp.path().to_path_buf();
    let journal = Arc::new(Journal::new(Arc::new(SystemClock)));
    let store = ConfigStore::new(dir.join("config.json"));
    let rules = Arc::new(RulesService::new(store, journal.clone()));
    let copy = CopyService::with_retry_policy(journal.clone(), 3, Duration::from_millis(1));
    let post = PostCopyService::new(Arc::new(SystemProcessRunner), journal.clone());
    let poller = Poller::new(rules.clone(), copy, post, journal.clone());
    World {
        poller,
        rules,
        journal,
        _temp: temp,
        dir,
    }
}

#[test]
fn destination_mapping_matches_the_documented_example() {
    // A rule watching /tmp/a/report.txt with root /backup mirrors into
    // /backup/_tmp_a/report.txt
    let source = Path::new("/tmp/a/report.txt");
    let root = Path::new("/backup");

    assert_eq!(destination_dir(source, root), PathBuf::from("/backup/_tmp_a"));
    assert_eq!(
        destination_file(source, root),
        PathBuf::from("/backup/_tmp_a/report.txt")
    );
}

#[tokio::test]
async fn three_cycle_lifecycle() {
    let w = world();
    let source_dir = w.dir.join("docs");
    std::fs::create_dir_all(&source_dir).unwrap();
    let source = source_dir.join("report.txt");
    std::fs::write(&source, "first draft").unwrap();
    let root = w.dir.join("backup");

    w.rules.add_rule(WatchRule::new(&source, &root)).unwrap();
    let mut rx = w.poller.subscribe();

    // Cycle 1: destination absent, so the file is copied
    w.poller.poll_once().await;
    let mirrored = destination_file(&source, &root);
    assert_eq!(std::fs::read_to_string(&mirrored).unwrap(), "first draft");
    assert_eq!(w.rules.rules()[0].status, RuleStatus::Synchronized);

    // Cycle 2: unchanged content, no copy and no events
    let before: Vec<PollerEvent> = drain(&mut rx);
    assert!(
        before
            .iter()
            .any(|e| matches!(e, PollerEvent::FileChanged { .. }))
    );
    w.poller.poll_once().await;
    assert!(drain(&mut rx).is_empty());
    assert_eq!(w.rules.rules()[0].status, RuleStatus::Synchronized);

    // Cycle 3: modified content triggers exactly one more FileChanged
    std::fs::write(&source, "second draft").unwrap();
    w.poller.poll_once().await;
    let events = drain(&mut rx);
    let changed = events
        .iter()
        .filter(|e| matches!(e, PollerEvent::FileChanged { .. }))
        .count();
    assert_eq!(changed, 1);
    assert_eq!(std::fs::read_to_string(&mirrored).unwrap(), "second draft");
}

#[tokio::test]
async fn deleting_the_source_surfaces_source_deleted_then_recovers() {
    let w = world();
    let source_dir = w.dir.join("docs");
    std::fs::create_dir_all(&source_dir).unwrap();
    let source = source_dir.join("notes.txt");
    std::fs::write(&source, "keep me").unwrap();
    let root = w.dir.join("backup");
    w.rules.add_rule(WatchRule::new(&source, &root)).unwrap();

    w.poller.poll_once().await;
    assert_eq!(w.rules.rules()[0].status, RuleStatus::Synchronized);

    std::fs::remove_file(&source).unwrap();
    w.poller.poll_once().await;
    assert_eq!(w.rules.rules()[0].status, RuleStatus::SourceDeleted);
    // The mirror is left in place
    assert!(destination_file(&source, &root).exists());

    std::fs::write(&source, "back again").unwrap();
    w.poller.poll_once().await;
    assert_eq!(w.rules.rules()[0].status, RuleStatus::Synchronized);
    assert_eq!(
        std::fs::read_to_string(destination_file(&source, &root)).unwrap(),
        "back again"
    );
}

#[tokio::test]
async fn oversized_source_marks_the_rule_error() {
    let w = world();
    let source_dir = w.dir.join("bulk");
    std::fs::create_dir_all(&source_dir).unwrap();
    let source = source_dir.join("dump.bin");
    let file = std::fs::File::create(&source).unwrap();
    file.set_len(11 * 1024 * 1024).unwrap();
    let root = w.dir.join("backup");
    w.rules.add_rule(WatchRule::new(&source, &root)).unwrap();

    w.poller.poll_once().await;

    assert_eq!(w.rules.rules()[0].status, RuleStatus::Error);
    assert!(!destination_file(&source, &root).exists());
    assert!(
        w.journal
            .entries()
            .iter()
            .any(|e| e.message.contains("exceeds limit"))
    );
}

#[tokio::test]
async fn rules_added_between_cycles_are_picked_up() {
    let w = world();
    let source_dir = w.dir.join("docs");
    std::fs::create_dir_all(&source_dir).unwrap();
    let root = w.dir.join("backup");

    let first = source_dir.join("first.txt");
    std::fs::write(&first, "one").unwrap();
    w.rules.add_rule(WatchRule::new(&first, &root)).unwrap();
    w.poller.poll_once().await;

    // The rules editor adds a second rule after the cycle
    let second = source_dir.join("second.txt");
    std::fs::write(&second, "two").unwrap();
    w.rules.add_rule(WatchRule::new(&second, &root)).unwrap();
    w.poller.poll_once().await;

    assert!(destination_file(&first, &root).exists());
    assert!(destination_file(&second, &root).exists());
}

#[tokio::test]
async fn configuration_survives_a_restart() {
    let temp = tempfile::tempdir().unwrap();
    let config_path = temp.path().join("config.json");
    let journal = Arc::new(Journal::new(Arc::new(SystemClock)));

    {
        let rules = RulesService::new(ConfigStore::new(&config_path), journal.clone());
        rules
            .add_rule(WatchRule::new("/watched/file.txt", "/backup"))
            .unwrap();
    }

    let reloaded = RulesService::new(ConfigStore::new(&config_path), journal);
    let rules = reloaded.rules();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].source_file, PathBuf::from("/watched/file.txt"));
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<PollerEvent>) -> Vec<PollerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
