//! Watch-rule ownership and persistence
//!
//! The rules service is the single writer of the authoritative rule
//! list. Every mutation persists the whole configuration immediately
//! through the store and then notifies subscribers. Rules are keyed by
//! their source path; statuses are an in-memory overlay written only by
//! the poller.

use crate::config::ConfigStore;
use crate::error::Result;
use crate::journal::Journal;
use crate::model::{Configuration, PollingSpeed, RuleStatus, WatchRule};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

const SOURCE: &str = "RulesService";

/// Change notification emitted after a rule mutation has been persisted
#[derive(Debug, Clone, PartialEq)]
pub enum RuleEvent {
    Added(WatchRule),
    Updated(WatchRule),
    Removed(WatchRule),
}

/// Owns the authoritative list of watch rules
pub struct RulesService {
    store: ConfigStore,
    journal: Arc<Journal>,
    config: Mutex<Configuration>,
    tx: broadcast::Sender<RuleEvent>,
}

impl RulesService {
    /// Load the configuration through `store` and take ownership of it
    pub fn new(store: ConfigStore, journal: Arc<Journal>) -> Self {
        let config = store.load(&journal);
        let (tx, _) = broadcast::channel(64);
        Self {
            store,
            journal,
            config: Mutex::new(config),
            tx,
        }
    }

    /// Snapshot of the rules in insertion order, with current statuses
    pub fn rules(&self) -> Vec<WatchRule> {
        self.lock().watch_rules.clone()
    }

    /// Subscribe to rule change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<RuleEvent> {
        self.tx.subscribe()
    }

    /// Add a rule and persist the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be saved.
    pub fn add_rule(&self, rule: WatchRule) -> Result<()> {
        {
            let mut config = self.lock();
            config.watch_rules.push(rule.clone());
            self.store.save(&config)?;
        }
        self.journal.info(
            format!(
                "Watch rule added: {} -> {}",
                rule.source_file.display(),
                rule.destination_root.display()
            ),
            SOURCE,
        );
        let _ = self.tx.send(RuleEvent::Added(rule));
        Ok(())
    }

    /// Update the rule matching `rule.source_file`.
    ///
    /// The source path is the natural key. A miss is a journaled no-op,
    /// not an error.
    pub fn update_rule(&self, rule: WatchRule) -> Result<()> {
        let updated = {
            let mut config = self.lock();
            match config
                .watch_rules
                .iter_mut()
                .find(|r| r.source_file == rule.source_file)
            {
                Some(existing) => {
                    existing.destination_root = rule.destination_root.clone();
                    existing.post_action = rule.post_action;
                    existing.is_enabled = rule.is_enabled;
                    let updated = existing.clone();
                    self.store.save(&config)?;
                    Some(updated)
                }
                None => None,
            }
        };

        match updated {
            Some(rule) => {
                self.journal.info(
                    format!("Watch rule updated: {}", rule.source_file.display()),
                    SOURCE,
                );
                let _ = self.tx.send(RuleEvent::Updated(rule));
            }
            None => {
                self.journal.warn(
                    format!(
                        "Watch rule not found for update: {}",
                        rule.source_file.display()
                    ),
                    SOURCE,
                );
            }
        }
        Ok(())
    }

    /// Remove the rule watching `source_file`.
    ///
    /// A miss is a journaled no-op, not an error.
    pub fn remove_rule(&self, source_file: &Path) -> Result<()> {
        let removed = {
            let mut config = self.lock();
            match config
                .watch_rules
                .iter()
                .position(|r| r.source_file == source_file)
            {
                Some(pos) => {
                    let rule = config.watch_rules.remove(pos);
                    self.store.save(&config)?;
                    Some(rule)
                }
                None => None,
            }
        };

        match removed {
            Some(rule) => {
                self.journal.info(
                    format!("Watch rule removed: {}", rule.source_file.display()),
                    SOURCE,
                );
                let _ = self.tx.send(RuleEvent::Removed(rule));
            }
            None => {
                self.journal.warn(
                    format!("Watch rule not found for removal: {}", source_file.display()),
                    SOURCE,
                );
            }
        }
        Ok(())
    }

    /// Record a rule's transient status. In-memory only; the poller is
    /// the single writer.
    pub fn set_status(&self, source_file: &Path, status: RuleStatus) {
        let mut config = self.lock();
        if let Some(rule) = config
            .watch_rules
            .iter_mut()
            .find(|r| r.source_file == source_file)
        {
            rule.status = status;
        }
    }

    /// The configured polling interval, re-read by the scheduler every cycle
    pub fn polling_speed(&self) -> PollingSpeed {
        self.lock().polling_speed
    }

    /// Change the polling interval; takes effect on the next cycle
    pub fn set_polling_speed(&self, speed: PollingSpeed) -> Result<()> {
        let mut config = self.lock();
        config.polling_speed = speed;
        self.store.save(&config)?;
        Ok(())
    }

    pub fn is_monitoring_active(&self) -> bool {
        self.lock().is_monitoring_active
    }

    pub fn set_monitoring_active(&self, active: bool) -> Result<()> {
        let mut config = self.lock();
        config.is_monitoring_active = active;
        self.store.save(&config)?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Configuration> {
        self.config.lock().expect("rules lock poisoned")
    }
}
