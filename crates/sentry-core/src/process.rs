//! External command execution
//!
//! Post-actions shell out to `git`; the runner is a trait so tests can
//! substitute a recording fake.

use crate::model::ProcessResult;
use std::path::Path;
use std::process::Command;

/// Synchronous external command invocation with captured output.
///
/// There is no implicit timeout: a hung command blocks the calling
/// cycle until it finishes.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String], working_dir: &Path)
    -> std::io::Result<ProcessResult>;
}

/// Runner backed by [`std::process::Command`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        working_dir: &Path,
    ) -> std::io::Result<ProcessResult> {
        let output = Command::new(program)
            .args(args)
            .current_dir(working_dir)
            .output()?;

        Ok(ProcessResult {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
