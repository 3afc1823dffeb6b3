//! Visibility Reconciler.
//!
//! Owns the arena of tracked items and turns viewport enter/exit events and
//! dwell-timer firings into read verdicts. The per-item state machine is the
//! pair of pure functions [`on_viewport_change`] and [`on_dwell_elapsed`];
//! the reconciler applies the transition they return through the host ports.
//!
//! Hiding is deferred: an item whose dwell completes while visible is only
//! recorded and hidden once it leaves the viewport.

use std::collections::HashMap;

use log::debug;

use crate::managers::feed_sync::FeedDocument;
use crate::services::dwell_timer::{DwellTimer, Scheduler};
use crate::services::storage::KeyValueStore;
use crate::services::tracker_state::{ReadStateTrait, TrackerState};
use crate::types::errors::StoreError;
use crate::types::event::IntersectionEntry;
use crate::types::feed::{FeedItemId, ItemState, TimerHandle, TrackedItem};

/// Effect requested by a state-machine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing to do.
    Stay,
    /// Start the dwell timer; the item becomes `PendingConfirmation`.
    StartDwell,
    /// Cancel the running dwell timer; the item goes back to `Unseen`.
    CancelDwell(TimerHandle),
    /// The dwell completed; the item becomes `ConfirmedRead`.
    Confirm,
    /// Record the item as read and hide it.
    Hide,
}

/// Step for an item entering (`entered == true`) or leaving the viewport.
pub fn on_viewport_change(state: ItemState, entered: bool, hiding_enabled: bool) -> Transition {
    match (state, entered) {
        (ItemState::Unseen, true) => Transition::StartDwell,
        (ItemState::PendingConfirmation { .. }, true) => Transition::Stay,
        (ItemState::PendingConfirmation { timer }, false) => Transition::CancelDwell(timer),
        (ItemState::ConfirmedRead, false) if hiding_enabled => Transition::Hide,
        _ => Transition::Stay,
    }
}

/// Step for a dwell timer firing with `handle`.
pub fn on_dwell_elapsed(state: ItemState, handle: TimerHandle) -> Transition {
    match state {
        ItemState::PendingConfirmation { timer } if timer == handle => Transition::Confirm,
        _ => Transition::Stay,
    }
}

pub struct VisibilityReconciler {
    items: HashMap<FeedItemId, TrackedItem>,
    dwell: DwellTimer,
    threshold: f64,
}

impl VisibilityReconciler {
    pub fn new(dwell: DwellTimer, threshold: f64) -> Self {
        Self {
            items: HashMap::new(),
            dwell,
            threshold,
        }
    }

    /// Starts tracking `id`. Returns `false` if it was already tracked.
    pub fn register(&mut self, id: &FeedItemId) -> bool {
        if self.items.contains_key(id) {
            return false;
        }
        self.items.insert(id.clone(), TrackedItem::default());
        true
    }

    /// Drops the record of a detached item.
    pub fn forget(&mut self, id: &FeedItemId) -> Option<TrackedItem> {
        self.items.remove(id)
    }

    pub fn get(&self, id: &FeedItemId) -> Option<&TrackedItem> {
        self.items.get(id)
    }

    pub fn state_of(&self, id: &FeedItemId) -> Option<ItemState> {
        self.items.get(id).map(|item| item.state)
    }

    pub fn is_tracked(&self, id: &FeedItemId) -> bool {
        self.items.contains_key(id)
    }

    pub fn tracked_count(&self) -> usize {
        self.items.len()
    }

    /// Applies one viewport-observer callback, entries in delivery order.
    pub fn handle_intersections<S, H>(
        &mut self,
        entries: &[IntersectionEntry],
        state: &mut TrackerState<S>,
        host: &mut H,
    ) -> Result<(), StoreError>
    where
        S: KeyValueStore,
        H: FeedDocument + Scheduler + ?Sized,
    {
        for entry in entries {
            let Some(id) = entry.item_id.clone().and_then(FeedItemId::new) else {
                debug!("event=intersection module=reconciler status=no_id");
                continue;
            };
            let entered = entry.ratio >= self.threshold;
            self.handle_viewport_change(&id, entered, state, host)?;
        }
        Ok(())
    }

    fn handle_viewport_change<S, H>(
        &mut self,
        id: &FeedItemId,
        entered: bool,
        state: &mut TrackerState<S>,
        host: &mut H,
    ) -> Result<(), StoreError>
    where
        S: KeyValueStore,
        H: FeedDocument + Scheduler + ?Sized,
    {
        let Some(item) = self.items.get_mut(id) else {
            debug!(
                "event=intersection module=reconciler id={} status=untracked",
                id
            );
            return Ok(());
        };
        item.in_viewport = entered;

        match on_viewport_change(item.state, entered, state.is_hiding_enabled()) {
            Transition::StartDwell => {
                let timer = self.dwell.start(host, id);
                item.state = ItemState::PendingConfirmation { timer };
                debug!("event=dwell_start module=reconciler id={}", id);
            }
            Transition::CancelDwell(timer) => {
                self.dwell.cancel(host, timer);
                item.state = ItemState::Unseen;
                debug!("event=dwell_cancel module=reconciler id={}", id);
            }
            Transition::Hide => {
                self.hide(id, state, host)?;
            }
            Transition::Stay | Transition::Confirm => {}
        }
        Ok(())
    }

    /// Applies a fired dwell timer. Stale handles and detached items are ignored.
    pub fn handle_dwell_elapsed(&mut self, id: &FeedItemId, handle: TimerHandle) {
        let Some(item) = self.items.get_mut(id) else {
            debug!(
                "event=dwell_elapsed module=reconciler id={} status=detached",
                id
            );
            return;
        };
        if on_dwell_elapsed(item.state, handle) == Transition::Confirm {
            item.state = ItemState::ConfirmedRead;
            debug!("event=dwell_confirmed module=reconciler id={}", id);
        }
    }

    /// Records `id` as read and applies the hidden-state marker right away.
    ///
    /// Does nothing while hiding is disabled. A running dwell timer is canceled.
    /// When persisting fails the item is left as it was.
    pub fn hide<S, H>(
        &mut self,
        id: &FeedItemId,
        state: &mut TrackerState<S>,
        host: &mut H,
    ) -> Result<(), StoreError>
    where
        S: KeyValueStore,
        H: FeedDocument + Scheduler + ?Sized,
    {
        if !state.is_hiding_enabled() {
            return Ok(());
        }
        state.mark_read(id)?;
        let item = self.items.entry(id.clone()).or_default();
        if let ItemState::PendingConfirmation { timer } = item.state {
            self.dwell.cancel(host, timer);
        }
        item.state = ItemState::Hidden;
        host.set_hidden(id, true);
        debug!("event=item_hidden module=reconciler id={}", id);
        Ok(())
    }

    /// Moves every hidden item back to `ConfirmedRead` after a bulk reveal.
    pub fn mark_all_revealed(&mut self) {
        for item in self.items.values_mut() {
            if item.state == ItemState::Hidden {
                item.state = ItemState::ConfirmedRead;
            }
        }
    }

    /// Items classified as read but never hidden that are out of view now.
    pub fn confirmed_out_of_view(&self) -> Vec<FeedItemId> {
        let mut ids: Vec<FeedItemId> = self
            .items
            .iter()
            .filter(|(_, item)| item.state == ItemState::ConfirmedRead && !item.in_viewport)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}
