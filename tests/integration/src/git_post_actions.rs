//! Git post-action scenarios against a real repository
//!
//! These tests drive the actual `git` binary and are skipped when it is
//! not installed.

use sentry_core::{
    Journal, PostAction, PostCopyService, ProcessRunner, SystemClock, SystemProcessRunner,
};
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Initialize a repository with an identity so commits succeed
fn init_repo(dir: &Path) {
    for args in [
        vec!["init"],
        vec!["config", "user.email", "sentry@example.com"],
        vec!["config", "user.name", "file-sentry"],
    ] {
        let status = Command::new("git")
            .args(&args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(status.status.success(), "git {args:?} failed");
    }
}

fn service() -> (PostCopyService, Arc<Journal>) {
    let journal = Arc::new(Journal::new(Arc::new(SystemClock)));
    (
        PostCopyService::new(Arc::new(SystemProcessRunner), journal.clone()),
        journal,
    )
}

#[test]
fn commit_action_creates_a_commit_with_the_backup_message() {
    if !git_available() {
        return;
    }

    let temp = tempfile::tempdir().unwrap();
    init_repo(temp.path());
    let file = temp.path().join("report.txt");
    std::fs::write(&file, "mirrored content").unwrap();

    let (service, _) = service();
    let ok = service.execute(
        PostAction::GitCommit,
        &file,
        temp.path(),
        Path::new("/tmp/a/report.txt"),
    );
    assert!(ok);

    let log = Command::new("git")
        .args(["log", "--format=%s", "-1"])
        .current_dir(temp.path())
        .output()
        .unwrap();
    let subject = String::from_utf8_lossy(&log.stdout);
    assert_eq!(subject.trim(), "Auto-backup from /tmp/a/report.txt");
}

#[test]
fn recommitting_an_unchanged_file_is_not_an_error() {
    if !git_available() {
        return;
    }

    let temp = tempfile::tempdir().unwrap();
    init_repo(temp.path());
    let file = temp.path().join("report.txt");
    std::fs::write(&file, "same content").unwrap();

    let (service, journal) = service();
    assert!(service.execute(PostAction::GitCommit, &file, temp.path(), Path::new("/src")));

    // Second run: nothing to commit, still a success
    assert!(service.execute(PostAction::GitCommit, &file, temp.path(), Path::new("/src")));
    assert!(
        journal
            .entries()
            .iter()
            .any(|e| e.message.contains("no changes to commit"))
    );
}

#[test]
fn missing_mirrored_file_fails_without_touching_the_repo() {
    if !git_available() {
        return;
    }

    let temp = tempfile::tempdir().unwrap();
    init_repo(temp.path());

    let (service, journal) = service();
    let ok = service.execute(
        PostAction::GitCommit,
        &temp.path().join("ghost.txt"),
        temp.path(),
        Path::new("/src"),
    );

    assert!(!ok);
    assert!(
        journal
            .entries()
            .iter()
            .any(|e| e.message.contains("does not exist"))
    );

    let log = Command::new("git")
        .args(["rev-list", "--count", "--all"])
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&log.stdout).trim(), "0");
}

#[test]
fn system_runner_captures_git_output() {
    if !git_available() {
        return;
    }

    let temp = tempfile::tempdir().unwrap();
    let result = SystemProcessRunner
        .run("git", &["--version".to_string()], temp.path())
        .unwrap();

    assert!(result.success());
    assert!(result.stdout.contains("git version"));
}
