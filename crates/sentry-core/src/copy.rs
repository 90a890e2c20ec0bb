//! Retrying file mirror operation
//!
//! Sources may be transiently locked by the producing application, so
//! the copy retries on I/O failure with a bounded, cancellable backoff
//! (at most 10 attempts, 500 ms apart). It never blocks indefinitely and
//! never retries forever.

use crate::journal::Journal;
use sentry_fs::path::{destination_dir, destination_file};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const SOURCE: &str = "CopyService";

/// Watched files are small config/text files; anything larger is
/// rejected outright rather than truncated.
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Retry ceiling for one copy operation
pub const MAX_COPY_ATTEMPTS: u32 = 10;

/// Wait between copy attempts
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Copies one watched file into its sanitized mirror location
pub struct CopyService {
    journal: Arc<Journal>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl CopyService {
    pub fn new(journal: Arc<Journal>) -> Self {
        Self::with_retry_policy(journal, MAX_COPY_ATTEMPTS, RETRY_DELAY)
    }

    /// Override the retry ceiling and delay; tests use fast policies
    pub fn with_retry_policy(
        journal: Arc<Journal>,
        max_attempts: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            journal,
            max_attempts,
            retry_delay,
        }
    }

    /// Copy `source` into the mirror tree under `destination_root`.
    ///
    /// Returns `true` only on an actually-completed copy. Failure paths
    /// are journaled, never raised: a missing or oversized source is a
    /// warning, a persistently failing copy is an error after the retry
    /// ceiling is exhausted. Cancellation interrupts the backoff wait
    /// immediately.
    pub async fn copy_file(
        &self,
        source: &Path,
        destination_root: &Path,
        cancel: &CancellationToken,
    ) -> bool {
        if !source.exists() {
            self.journal.warn(
                format!("Source file not found: {}", source.display()),
                SOURCE,
            );
            return false;
        }

        let size = match std::fs::metadata(source) {
            Ok(meta) => meta.len(),
            Err(e) => {
                self.journal.error(
                    format!("Failed to read metadata for {}: {e}", source.display()),
                    SOURCE,
                );
                return false;
            }
        };
        if size > MAX_FILE_SIZE_BYTES {
            self.journal.warn(
                format!(
                    "File size {} MiB exceeds limit, skipping: {}",
                    size / 1024 / 1024,
                    source.display()
                ),
                SOURCE,
            );
            return false;
        }

        let dest_dir = destination_dir(source, destination_root);
        let dest_file = destination_file(source, destination_root);

        if let Err(e) = std::fs::create_dir_all(&dest_dir) {
            self.journal.error(
                format!(
                    "Failed to create destination directory {}: {e}",
                    dest_dir.display()
                ),
                SOURCE,
            );
            return false;
        }

        for attempt in 1..=self.max_attempts {
            match std::fs::copy(source, &dest_file) {
                Ok(_) => {
                    self.journal.info(
                        format!(
                            "File copied successfully: {} -> {}",
                            source.display(),
                            dest_file.display()
                        ),
                        SOURCE,
                    );
                    return true;
                }
                // Source vanished mid-flight; retrying cannot help
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    self.journal.error(
                        format!("Source disappeared during copy of {}: {e}", source.display()),
                        SOURCE,
                    );
                    return false;
                }
                Err(e) if attempt < self.max_attempts => {
                    self.journal.warn(
                        format!(
                            "Copy attempt {attempt} failed for {}: {e}. Retrying...",
                            source.display()
                        ),
                        SOURCE,
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            self.journal.info(
                                format!("Copy cancelled for {}", source.display()),
                                SOURCE,
                            );
                            return false;
                        }
                        _ = tokio::time::sleep(self.retry_delay) => {}
                    }
                }
                Err(_) => break,
            }
        }

        self.journal.error(
            format!(
                "Failed to copy file after {} attempts: {}",
                self.max_attempts,
                source.display()
            ),
            SOURCE,
        );
        false
    }
}
