//! In-memory journal: the engine's narration channel
//!
//! Every significant decision the engine makes lands here. The journal is
//! an append-only bounded ring; entries are also mirrored to `tracing`
//! and fanned out to subscribers, so a UI can follow along live while
//! `RUST_LOG` consumers see the same stream.

use crate::clock::Clock;
use crate::model::{LogEntry, LogLevel};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Maximum number of retained entries; oldest are evicted first
pub const JOURNAL_CAPACITY: usize = 10_000;

/// Bounded, clock-stamped log sink shared by every engine component
pub struct Journal {
    clock: Arc<dyn Clock>,
    entries: Mutex<VecDeque<LogEntry>>,
    tx: broadcast::Sender<LogEntry>,
}

impl Journal {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let (tx, _) = broadcast::channel(256);
        Self {
            clock,
            entries: Mutex::new(VecDeque::new()),
            tx,
        }
    }

    /// Append an entry, evicting the oldest if the ring is full
    pub fn log(&self, level: LogLevel, message: impl Into<String>, source: Option<&str>) {
        let entry = LogEntry {
            timestamp: self.clock.now_utc(),
            level,
            message: message.into(),
            source: source.map(str::to_string),
        };

        let component = entry.source.as_deref().unwrap_or("");
        match level {
            LogLevel::Info => tracing::info!(component, "{}", entry.message),
            LogLevel::Warning => tracing::warn!(component, "{}", entry.message),
            LogLevel::Error => tracing::error!(component, "{}", entry.message),
        }

        {
            let mut entries = self.entries.lock().expect("journal lock poisoned");
            entries.push_back(entry.clone());
            while entries.len() > JOURNAL_CAPACITY {
                entries.pop_front();
            }
        }

        // No receivers is fine; the journal never blocks or fails
        let _ = self.tx.send(entry);
    }

    pub fn info(&self, message: impl Into<String>, source: &str) {
        self.log(LogLevel::Info, message, Some(source));
    }

    pub fn warn(&self, message: impl Into<String>, source: &str) {
        self.log(LogLevel::Warning, message, Some(source));
    }

    pub fn error(&self, message: impl Into<String>, source: &str) {
        self.log(LogLevel::Error, message, Some(source));
    }

    /// Snapshot of the retained entries, oldest first
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .expect("journal lock poisoned")
            .iter()
            .cloned()
            .collect()
    }

    /// Subscribe to entries appended after this call
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.tx.subscribe()
    }
}

impl std::fmt::Debug for Journal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal")
            .field("entries", &self.entries.lock().map(|e| e.len()).unwrap_or(0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::clock::test_support::FixedClock;
    use chrono::{TimeZone, Utc};

    fn journal() -> Journal {
        Journal::new(Arc::new(SystemClock))
    }

    #[test]
    fn entries_are_appended_in_order() {
        let journal = journal();
        journal.info("first", "Test");
        journal.warn("second", "Test");
        journal.error("third", "Test");

        let entries = journal.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].message, "first");
        assert_eq!(entries[0].level, LogLevel::Info);
        assert_eq!(entries[1].level, LogLevel::Warning);
        assert_eq!(entries[2].level, LogLevel::Error);
    }

    #[test]
    fn entries_carry_source_and_clock_timestamp() {
        let instant = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let journal = Journal::new(Arc::new(FixedClock(instant)));
        journal.info("message", "CopyService");

        let entries = journal.entries();
        assert_eq!(entries[0].source.as_deref(), Some("CopyService"));
        assert_eq!(entries[0].timestamp, instant);
    }

    #[test]
    fn ring_evicts_oldest_beyond_capacity() {
        let journal = journal();
        for i in 0..(JOURNAL_CAPACITY + 5) {
            journal.info(format!("entry {i}"), "Test");
        }

        let entries = journal.entries();
        assert_eq!(entries.len(), JOURNAL_CAPACITY);
        assert_eq!(entries[0].message, "entry 5");
    }

    #[tokio::test]
    async fn subscribers_receive_appended_entries() {
        let journal = journal();
        let mut rx = journal.subscribe();

        journal.info("broadcast me", "Test");

        let entry = rx.recv().await.unwrap();
        assert_eq!(entry.message, "broadcast me");
    }
}
