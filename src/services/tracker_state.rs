//! Owned, persisted tracker state: the read store and the enabled flag.
//!
//! Both values are read from storage once at construction and written
//! through on every change. A failed read degrades to the default; a failed
//! write is returned to the caller with the in-memory value already updated.

use log::{debug, info, warn};

use crate::services::read_store::{MarkOutcome, ReadStore};
use crate::services::storage::KeyValueStore;
use crate::types::errors::StoreError;
use crate::types::feed::FeedItemId;
use crate::types::settings::StoreSettings;

/// Trait defining persisted read-state operations.
pub trait ReadStateTrait {
    fn contains(&self, id: &FeedItemId) -> bool;
    fn mark_read(&mut self, id: &FeedItemId) -> Result<MarkOutcome, StoreError>;
    fn read_count(&self) -> usize;
    fn is_hiding_enabled(&self) -> bool;
    fn set_hiding_enabled(&mut self, enabled: bool) -> Result<(), StoreError>;
}

pub struct TrackerState<S: KeyValueStore> {
    storage: S,
    read: ReadStore,
    hiding_enabled: bool,
    read_ids_key: String,
    enabled_key: String,
}

impl<S: KeyValueStore> TrackerState<S> {
    /// Rehydrates state from `storage`.
    pub fn load(storage: S, settings: &StoreSettings) -> Self {
        let read = match storage.get(&settings.read_ids_key) {
            Ok(Some(raw)) => ReadStore::from_json(&raw, settings.max_ids),
            Ok(None) => ReadStore::new(settings.max_ids),
            Err(err) => {
                warn!(
                    "event=state_load module=tracker_state key={} status=error error={}",
                    settings.read_ids_key, err
                );
                ReadStore::new(settings.max_ids)
            }
        };

        // Only the literal "true" enables hiding.
        let hiding_enabled = match storage.get(&settings.enabled_key) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(err) => {
                warn!(
                    "event=state_load module=tracker_state key={} status=error error={}",
                    settings.enabled_key, err
                );
                false
            }
        };

        info!(
            "event=state_load module=tracker_state status=ok read_ids={} hiding_enabled={}",
            read.len(),
            hiding_enabled
        );

        Self {
            storage,
            read,
            hiding_enabled,
            read_ids_key: settings.read_ids_key.clone(),
            enabled_key: settings.enabled_key.clone(),
        }
    }

    pub fn read_store(&self) -> &ReadStore {
        &self.read
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist_read_ids(&mut self) -> Result<(), StoreError> {
        let json = self.read.to_json()?;
        self.storage.set(&self.read_ids_key, &json)
    }
}

impl<S: KeyValueStore> ReadStateTrait for TrackerState<S> {
    fn contains(&self, id: &FeedItemId) -> bool {
        self.read.contains(id)
    }

    /// Records `id` as read and writes the whole list back when it changed.
    fn mark_read(&mut self, id: &FeedItemId) -> Result<MarkOutcome, StoreError> {
        let outcome = self.read.insert(id.clone());
        match outcome {
            MarkOutcome::AlreadyPresent => {}
            MarkOutcome::Inserted => self.persist_read_ids()?,
            MarkOutcome::Evicted => {
                debug!(
                    "event=mark_read module=tracker_state id={} status=evicted capacity={}",
                    id,
                    self.read.max_ids()
                );
                self.persist_read_ids()?;
            }
        }
        Ok(outcome)
    }

    fn read_count(&self) -> usize {
        self.read.len()
    }

    fn is_hiding_enabled(&self) -> bool {
        self.hiding_enabled
    }

    fn set_hiding_enabled(&mut self, enabled: bool) -> Result<(), StoreError> {
        self.hiding_enabled = enabled;
        let value = if enabled { "true" } else { "false" };
        self.storage.set(&self.enabled_key, value)
    }
}
