//! Polling scheduler
//!
//! A single background loop walks the rule list on a fixed cadence,
//! decides per rule whether the source differs from its mirror, and
//! drives the copy and post-action pipeline. Rules are processed
//! sequentially so the journal stream and status events stay
//! deterministic and git never runs twice in one working tree at once.

use crate::copy::CopyService;
use crate::journal::Journal;
use crate::model::{RuleStatus, WatchRule};
use crate::post::PostCopyService;
use crate::rules::RulesService;
use sentry_fs::checksum;
use sentry_fs::path::{destination_dir, destination_file};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const SOURCE: &str = "Poller";

/// Notification pushed by the scheduler as it processes rules
#[derive(Debug, Clone, PartialEq)]
pub enum PollerEvent {
    /// A content change was detected, before the copy begins
    FileChanged { source: PathBuf },
    /// A rule's status transitioned
    StatusChanged { source: PathBuf, status: RuleStatus },
}

/// The background scheduler
pub struct Poller {
    inner: Arc<PollerInner>,
    running: AtomicBool,
    cancel: Mutex<Option<CancellationToken>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

struct PollerInner {
    rules: Arc<RulesService>,
    copy: CopyService,
    post: PostCopyService,
    journal: Arc<Journal>,
    events: broadcast::Sender<PollerEvent>,
}

impl Poller {
    pub fn new(
        rules: Arc<RulesService>,
        copy: CopyService,
        post: PostCopyService,
        journal: Arc<Journal>,
    ) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            inner: Arc::new(PollerInner {
                rules,
                copy,
                post,
                journal,
                events,
            }),
            running: AtomicBool::new(false),
            cancel: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    /// Subscribe to scheduler events
    pub fn subscribe(&self) -> broadcast::Receiver<PollerEvent> {
        self.inner.events.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Begin the polling loop. Idempotent: a second call is a journaled
    /// no-op while the loop is running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            self.inner.journal.warn("Poller is already running", SOURCE);
            return;
        }

        let token = CancellationToken::new();
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(run_loop(inner, token.clone()));

        *self.cancel.lock().expect("poller lock poisoned") = Some(token);
        *self.task.lock().expect("poller lock poisoned") = Some(handle);
        self.inner.journal.info("Poller started", SOURCE);
    }

    /// Signal cancellation and wait for the in-flight cycle to finish.
    ///
    /// No further events are emitted once this returns. Idempotent.
    pub async fn stop(&self) {
        // The caller that wins the swap owns the shutdown; everyone else
        // returns without touching the token or the handle
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        if let Some(token) = self.cancel.lock().expect("poller lock poisoned").take() {
            token.cancel();
        }
        let handle = self.task.lock().expect("poller lock poisoned").take();
        if let Some(handle) = handle {
            // The task never panics; join errors only occur on abort
            let _ = handle.await;
        }

        self.inner.journal.info("Poller stopped", SOURCE);
    }

    /// Process every enabled rule exactly once, without starting the loop.
    ///
    /// Used by one-shot drivers and tests; the background loop runs the
    /// same pass each cycle.
    pub async fn poll_once(&self) {
        let token = CancellationToken::new();
        self.inner.process_all_rules(&token).await;
    }
}

/// Loop until cancelled: one pass over the rules, then a cancellable
/// wait for the currently-configured interval.
async fn run_loop(inner: Arc<PollerInner>, cancel: CancellationToken) {
    while !cancel.is_cancelled() {
        inner.process_all_rules(&cancel).await;

        // Re-read the interval every cycle so a speed change takes
        // effect without a restart
        let interval = inner.rules.polling_speed().interval();
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
    inner.journal.info("Polling cancelled", SOURCE);
}

impl PollerInner {
    /// One cycle: every enabled rule, sequentially. A rule's failure
    /// never aborts the batch.
    async fn process_all_rules(&self, cancel: &CancellationToken) {
        let rules = self.rules.rules();
        for rule in rules {
            if !rule.is_enabled {
                continue;
            }
            self.process_rule(&rule, cancel).await;
        }
    }

    async fn process_rule(&self, rule: &WatchRule, cancel: &CancellationToken) {
        let source = rule.source_file.as_path();

        if !source.exists() {
            self.transition(source, RuleStatus::SourceDeleted);
            return;
        }

        // Tentatively synchronized until proven otherwise
        self.rules.set_status(source, RuleStatus::Synchronized);

        let changed = match self.has_changed(rule) {
            Ok(changed) => changed,
            Err(e) => {
                self.journal.error(
                    format!("Error processing rule for {}: {e}", source.display()),
                    SOURCE,
                );
                self.transition(source, RuleStatus::Error);
                return;
            }
        };
        if !changed {
            return;
        }

        self.journal.info(
            format!("File change detected: {}", source.display()),
            SOURCE,
        );
        let _ = self.events.send(PollerEvent::FileChanged {
            source: source.to_path_buf(),
        });
        self.transition(source, RuleStatus::Copying);

        let copied = self
            .copy
            .copy_file(source, &rule.destination_root, cancel)
            .await;

        if copied {
            let dest_dir = destination_dir(source, &rule.destination_root);
            let dest_file = destination_file(source, &rule.destination_root);
            let post_ok = self
                .post
                .execute(rule.post_action, &dest_file, &dest_dir, source);
            if !post_ok {
                // The file itself is mirrored; not reverting the status
                // avoids re-running a failing git operation every cycle
                self.journal.warn(
                    format!(
                        "Post-action {} failed for {}",
                        rule.post_action,
                        source.display()
                    ),
                    SOURCE,
                );
            }
            self.transition(source, RuleStatus::Synchronized);
        } else {
            self.transition(source, RuleStatus::Error);
        }
    }

    /// A rule needs copying when the mirror is absent or its digest
    /// differs from the source's.
    fn has_changed(&self, rule: &WatchRule) -> std::io::Result<bool> {
        let source_hash = checksum::hash_file(&rule.source_file)?;
        let dest_file = destination_file(&rule.source_file, &rule.destination_root);

        if !dest_file.exists() {
            return Ok(true);
        }

        let dest_hash = checksum::hash_file(&dest_file)?;
        Ok(source_hash != dest_hash)
    }

    fn transition(&self, source: &Path, status: RuleStatus) {
        self.rules.set_status(source, status);
        let _ = self.events.send(PollerEvent::StatusChanged {
            source: source.to_path_buf(),
            status,
        });
    }
}
