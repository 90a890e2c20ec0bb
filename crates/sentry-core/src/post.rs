//! Post-copy actions
//!
//! After a successful mirror the rule's configured action runs against
//! the mirrored file: nothing, a git commit, or a commit plus push. The
//! action set is closed, so dispatch is a plain enum match. Actions
//! never raise; every failure path is journaled and folded into the
//! boolean result.

use crate::journal::Journal;
use crate::model::{PostAction, ProcessResult};
use crate::process::ProcessRunner;
use std::path::Path;
use std::sync::Arc;

/// Dispatches the configured [`PostAction`] after a successful copy
pub struct PostCopyService {
    runner: Arc<dyn ProcessRunner>,
    journal: Arc<Journal>,
}

impl PostCopyService {
    pub fn new(runner: Arc<dyn ProcessRunner>, journal: Arc<Journal>) -> Self {
        Self { runner, journal }
    }

    /// Run `action` for the mirrored file.
    ///
    /// `file_path` is the mirrored copy, `destination_dir` the directory
    /// the external command runs in, `source_file` the watched original
    /// (quoted in the commit message).
    pub fn execute(
        &self,
        action: PostAction,
        file_path: &Path,
        destination_dir: &Path,
        source_file: &Path,
    ) -> bool {
        match action {
            PostAction::None => true,
            PostAction::GitCommit => {
                self.git_commit(file_path, destination_dir, source_file, false)
            }
            PostAction::GitCommitAndPush => {
                self.git_commit(file_path, destination_dir, source_file, true)
            }
        }
    }

    fn git_commit(
        &self,
        file_path: &Path,
        destination_dir: &Path,
        source_file: &Path,
        push: bool,
    ) -> bool {
        let source = if push { "GitCommitAndPush" } else { "GitCommit" };

        // Independent of the copy service's own checks
        if !file_path.exists() {
            self.journal.error(
                format!("File does not exist: {}", file_path.display()),
                source,
            );
            return false;
        }

        let add_args = vec!["add".to_string(), file_path.display().to_string()];
        let Some(add) = self.run_git(&add_args, destination_dir, source) else {
            return false;
        };
        if !add.success() {
            self.journal.error(
                format!(
                    "Git add failed with exit code {:?}: {}",
                    add.exit_code,
                    add.error_detail()
                ),
                source,
            );
            return false;
        }

        let commit_args = vec![
            "commit".to_string(),
            "-m".to_string(),
            format!("Auto-backup from {}", source_file.display()),
        ];
        let Some(commit) = self.run_git(&commit_args, destination_dir, source) else {
            return false;
        };
        if !commit.success() {
            let detail = commit.error_detail();
            // Re-processing an unchanged file must not be an error, and
            // an empty commit leaves nothing worth pushing
            if detail.contains("nothing to commit") || detail.contains("working tree clean") {
                self.journal.info(
                    format!(
                        "Git commit skipped - no changes to commit for {}",
                        file_path.display()
                    ),
                    source,
                );
                return true;
            }
            self.journal.error(
                format!(
                    "Git commit failed with exit code {:?}: {detail}",
                    commit.exit_code
                ),
                source,
            );
            return false;
        }

        self.journal.info(
            format!("Git commit completed for {}", file_path.display()),
            source,
        );

        if !push {
            return true;
        }

        let Some(pushed) = self.run_git(&["push".to_string()], destination_dir, source) else {
            return false;
        };
        if !pushed.success() {
            self.journal.error(
                format!(
                    "Git push failed with exit code {:?}: {}",
                    pushed.exit_code,
                    pushed.error_detail()
                ),
                source,
            );
            return false;
        }

        self.journal.info(
            format!("Git commit and push completed for {}", file_path.display()),
            source,
        );
        true
    }

    fn run_git(&self, args: &[String], cwd: &Path, source: &str) -> Option<ProcessResult> {
        match self.runner.run("git", args, cwd) {
            Ok(result) => Some(result),
            Err(e) => {
                self.journal
                    .error(format!("Failed to invoke git: {e}"), source);
                None
            }
        }
    }
}
