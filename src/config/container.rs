//! Configuration state container
//!
//! Sole owner of the live settings record. Readers get `Arc` snapshots; every
//! accepted change swaps in a new snapshot, bumps the version, hands it to the
//! persister and wakes subscribers.
//!
//! A container with a persister starts out unhydrated: the stored record has
//! not been read yet, so writing would clobber it. Until `adopt` or `settle`
//! runs, accepted changes are journaled and nothing is written.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::patch::ConfigPatch;
use super::settings::Configuration;
use crate::error::ConfigError;
use crate::store::Persist;

/// A change accepted before the stored record was reconciled in
#[derive(Debug, Clone)]
enum EarlyChange {
    Update(ConfigPatch),
    Reset,
}

pub struct ConfigContainer {
    current: Arc<Configuration>,
    notifier: watch::Sender<Arc<Configuration>>,
    persister: Option<Box<dyn Persist>>,
    /// `Some` until hydration settles
    early_changes: Option<Vec<EarlyChange>>,
}

impl Default for ConfigContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigContainer {
    /// Container holding the documented defaults, without persistence.
    /// This is what a server render uses.
    pub fn new() -> Self {
        let current = Arc::new(Configuration::default());
        let (notifier, _) = watch::channel(current.clone());
        Self {
            current,
            notifier,
            persister: None,
            early_changes: None,
        }
    }

    /// Container holding the defaults whose accepted changes go to `persister`
    /// once hydration has settled
    pub fn with_persister(persister: Box<dyn Persist>) -> Self {
        Self {
            persister: Some(persister),
            early_changes: Some(Vec::new()),
            ..Self::new()
        }
    }

    pub fn read(&self) -> Arc<Configuration> {
        self.current.clone()
    }

    /// Receiver woken on every accepted change
    pub fn subscribe(&self) -> watch::Receiver<Arc<Configuration>> {
        self.notifier.subscribe()
    }

    /// Validate and apply a partial update. All-or-nothing: on error the
    /// current snapshot is left exactly as it was.
    pub fn update(&mut self, patch: &ConfigPatch) -> Result<Arc<Configuration>, ConfigError> {
        let mut next = patch.apply_to(&self.current).inspect_err(|err| {
            warn!(error = %err, "Rejected settings update");
        })?;
        next.version = self.current.version + 1;

        info!(version = next.version, fields = patch.len(), "Settings updated");
        if let Some(early) = &mut self.early_changes {
            early.push(EarlyChange::Update(patch.clone()));
        }
        Ok(self.commit(next, true))
    }

    /// Restore the documented defaults. Counts as a change: the version moves on.
    pub fn reset(&mut self) -> Arc<Configuration> {
        let next = Configuration {
            version: self.current.version + 1,
            ..Configuration::default()
        };
        info!(version = next.version, "Settings reset to defaults");
        if let Some(early) = &mut self.early_changes {
            early.push(EarlyChange::Reset);
        }
        self.commit(next, true)
    }

    /// Replace the whole record with one restored from storage and settle
    /// hydration.
    ///
    /// Changes accepted before this call are replayed on top of `restored`, so
    /// neither side is lost. The version ends up ahead of both the stored one
    /// and ours, keeping the counter monotonic across sessions. A record with
    /// nothing replayed onto it is not written back since it came from the
    /// store; a merged one is.
    pub(crate) fn adopt(&mut self, restored: Configuration) -> Arc<Configuration> {
        let early = self.early_changes.take().unwrap_or_default();
        if early.is_empty() {
            let version = restored.version.max(self.current.version + 1);
            info!(version, "Adopted stored settings");
            return self.commit(Configuration { version, ..restored }, false);
        }

        let version = restored.version.max(self.current.version) + 1;
        let merged = early.iter().fold(restored, |record, change| match change {
            EarlyChange::Update(patch) => match patch.apply_to(&record) {
                Ok(next) => next,
                Err(err) => {
                    warn!(error = %err, "Dropped an early change that no longer applies");
                    record
                }
            },
            EarlyChange::Reset => Configuration::default(),
        });
        info!(version, replayed = early.len(), "Merged early changes into stored settings");
        self.commit(Configuration { version, ..merged }, true)
    }

    /// Nothing usable was stored: end hydration with the in-memory record as
    /// the source of truth, writing it if it was changed along the way
    pub(crate) fn settle(&mut self) {
        let Some(early) = self.early_changes.take() else {
            return;
        };
        if !early.is_empty() {
            debug!(version = self.current.version, "Writing changes held back during hydration");
            if let Some(persister) = &self.persister {
                persister.persist(&self.current);
            }
        }
    }

    fn commit(&mut self, next: Configuration, persist: bool) -> Arc<Configuration> {
        let snapshot = Arc::new(next);
        self.current = snapshot.clone();

        if persist {
            match (&self.persister, &self.early_changes) {
                (Some(_), Some(_)) => debug!(version = snapshot.version, "Holding back write until stored settings are reconciled"),
                (Some(persister), None) => persister.persist(&snapshot),
                (None, _) => debug!(version = snapshot.version, "No persister attached; change kept in memory"),
            }
        }

        self.notifier.send_replace(snapshot.clone());
        snapshot
    }
}
