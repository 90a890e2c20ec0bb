//! Data model for the synchronization engine
//!
//! Serde field names are camelCase to stay compatible with configuration
//! blobs written by earlier versions of the tool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

fn default_true() -> bool {
    true
}

/// Action to run after a watched file has been mirrored successfully
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostAction {
    /// No post-action; mirroring alone is the outcome
    #[default]
    None,
    /// `git add` + `git commit` in the mirror directory
    GitCommit,
    /// `git add` + `git commit` + `git push` in the mirror directory
    GitCommitAndPush,
}

impl fmt::Display for PostAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::GitCommit => write!(f, "git-commit"),
            Self::GitCommitAndPush => write!(f, "git-commit-and-push"),
        }
    }
}

/// Transient per-rule state, owned by the poller and never persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RuleStatus {
    /// Source and mirror agree, or the last copy completed
    #[default]
    Synchronized,
    /// A copy plus post-action is in flight
    Copying,
    /// The last processing attempt for this rule failed
    Error,
    /// The source file no longer exists
    SourceDeleted,
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Synchronized => write!(f, "synchronized"),
            Self::Copying => write!(f, "copying"),
            Self::Error => write!(f, "error"),
            Self::SourceDeleted => write!(f, "source-deleted"),
        }
    }
}

/// One monitored source-file-to-destination-root mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchRule {
    /// Absolute path to the single watched file
    #[serde(rename = "sourceFile")]
    pub source_file: PathBuf,
    /// Absolute path to the root of the mirror tree
    #[serde(rename = "destinationRoot")]
    pub destination_root: PathBuf,
    /// Action to run after a successful copy
    #[serde(rename = "postAction", default)]
    pub post_action: PostAction,
    /// Disabled rules are skipped by the scheduler
    #[serde(rename = "isEnabled", default = "default_true")]
    pub is_enabled: bool,
    /// Current scheduler view of the rule; not persisted
    #[serde(skip)]
    pub status: RuleStatus,
}

impl WatchRule {
    /// Create an enabled rule with no post-action
    pub fn new(source_file: impl Into<PathBuf>, destination_root: impl Into<PathBuf>) -> Self {
        Self {
            source_file: source_file.into(),
            destination_root: destination_root.into(),
            post_action: PostAction::None,
            is_enabled: true,
            status: RuleStatus::default(),
        }
    }

    /// Set the post-action (builder style)
    pub fn with_post_action(mut self, post_action: PostAction) -> Self {
        self.post_action = post_action;
        self
    }
}

/// How often the scheduler walks the rule list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollingSpeed {
    /// Every 10 minutes
    Slow,
    /// Every minute
    Medium,
    /// Every 10 seconds
    #[default]
    Fast,
}

impl PollingSpeed {
    /// The wait between polling cycles
    pub fn interval(self) -> Duration {
        Duration::from_secs(self.as_seconds())
    }

    /// The wait between polling cycles, in seconds
    pub fn as_seconds(self) -> u64 {
        match self {
            Self::Slow => 600,
            Self::Medium => 60,
            Self::Fast => 10,
        }
    }
}

/// Persisted application state: the interval, the master switch, and the rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(rename = "pollingSpeed", default)]
    pub polling_speed: PollingSpeed,
    #[serde(rename = "isMonitoringActive", default = "default_true")]
    pub is_monitoring_active: bool,
    #[serde(rename = "watchRules", default)]
    pub watch_rules: Vec<WatchRule>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            polling_speed: PollingSpeed::default(),
            is_monitoring_active: true,
            watch_rules: Vec::new(),
        }
    }
}

/// Severity of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

/// One entry in the in-memory journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub source: Option<String>,
}

/// Captured outcome of one external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// Exit code, if the process terminated normally
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessResult {
    /// True when the process exited with code zero
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// The most useful diagnostic text: stderr when present, stdout otherwise
    pub fn error_detail(&self) -> &str {
        if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}
