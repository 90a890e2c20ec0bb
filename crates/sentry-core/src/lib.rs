//! Synchronization engine for file-sentry
//!
//! Watches a set of individual files on a fixed polling cadence and
//! mirrors each one into a sanitized destination tree when its content
//! changes, optionally committing the mirror to git afterwards.
//!
//! # Architecture
//!
//! `sentry-core` sits between the filesystem layer and the CLI:
//!
//! ```text
//!        CLI
//!         |
//!     sentry-core
//!    (rules, poller, copy, post-actions)
//!         |
//!     sentry-fs
//!    (path mapping, checksums, atomic I/O)
//! ```
//!
//! One poll cycle flows one way: the poller reads the rule list, hashes
//! source against mirror per rule, copies on difference, runs the
//! configured post-action, and publishes status transitions to
//! subscribers. Every decision is narrated through the [`Journal`].

pub mod clock;
pub mod config;
pub mod copy;
pub mod error;
pub mod journal;
pub mod model;
pub mod poller;
pub mod post;
pub mod process;
pub mod rules;

pub use clock::{Clock, SystemClock};
pub use config::ConfigStore;
pub use copy::{CopyService, MAX_COPY_ATTEMPTS, MAX_FILE_SIZE_BYTES, RETRY_DELAY};
pub use error::{Error, Result};
pub use journal::{JOURNAL_CAPACITY, Journal};
pub use model::{
    Configuration, LogEntry, LogLevel, PollingSpeed, PostAction, ProcessResult, RuleStatus,
    WatchRule,
};
pub use poller::{Poller, PollerEvent};
pub use post::PostCopyService;
pub use process::{ProcessRunner, SystemProcessRunner};
pub use rules::{RuleEvent, RulesService};
