//! Bounded, insertion-ordered set of read item ids.
//!
//! Capacity enforcement removes the *last* element of the set while it is
//! over capacity. Because inserts append, a full store evicts the id that
//! was just added and keeps the oldest ones.

use std::collections::HashSet;

use log::warn;

use crate::types::errors::StoreError;
use crate::types::feed::FeedItemId;

/// Default capacity of the read store.
pub const MAX_IDS: usize = 1000;

/// Result of recording an id as read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// The id was added and kept.
    Inserted,
    /// The id was already present; nothing changed.
    AlreadyPresent,
    /// The id was added and immediately removed by capacity enforcement.
    Evicted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadStore {
    order: Vec<FeedItemId>,
    members: HashSet<FeedItemId>,
    max_ids: usize,
}

impl ReadStore {
    pub fn new(max_ids: usize) -> Self {
        Self {
            order: Vec::new(),
            members: HashSet::new(),
            max_ids,
        }
    }

    /// Rehydrates a store from its persisted JSON list.
    ///
    /// Anything that is not a JSON array of strings yields an empty store.
    /// Duplicates keep their first position; empty ids are dropped.
    pub fn from_json(raw: &str, max_ids: usize) -> Self {
        let mut store = Self::new(max_ids);
        let ids: Vec<String> = match serde_json::from_str::<Option<Vec<String>>>(raw) {
            Ok(ids) => ids.unwrap_or_default(),
            Err(err) => {
                warn!(
                    "event=read_store_load module=read_store status=malformed error={}",
                    err
                );
                return store;
            }
        };
        for id in ids.into_iter().filter_map(FeedItemId::new) {
            if store.members.insert(id.clone()) {
                store.order.push(id);
            }
        }
        store.enforce_capacity();
        store
    }

    /// Serializes the ids in insertion order.
    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string(&self.order).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    pub fn contains(&self, id: &FeedItemId) -> bool {
        self.members.contains(id)
    }

    /// Adds `id` if absent, then enforces capacity.
    pub fn insert(&mut self, id: FeedItemId) -> MarkOutcome {
        if self.members.contains(&id) {
            return MarkOutcome::AlreadyPresent;
        }
        self.members.insert(id.clone());
        self.order.push(id.clone());
        let evicted = self.enforce_capacity();
        if evicted.contains(&id) {
            MarkOutcome::Evicted
        } else {
            MarkOutcome::Inserted
        }
    }

    /// Removes the last element until the store fits; returns what was removed.
    fn enforce_capacity(&mut self) -> Vec<FeedItemId> {
        let mut evicted = Vec::new();
        while self.order.len() > self.max_ids {
            if let Some(last) = self.order.pop() {
                self.members.remove(&last);
                evicted.push(last);
            }
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> &[FeedItemId] {
        &self.order
    }

    pub fn max_ids(&self) -> usize {
        self.max_ids
    }
}

impl Default for ReadStore {
    fn default() -> Self {
        Self::new(MAX_IDS)
    }
}
