//! Feed Sync Pipeline.
//!
//! Keeps the reconciler's arena in step with a document whose feed items are
//! inserted and removed asynchronously. Every discovered item is registered
//! with the viewport observer exactly once, and items already in the read
//! store are hidden on discovery while hiding is enabled.

use std::time::Duration;

use log::{debug, info};

use crate::managers::visibility_reconciler::VisibilityReconciler;
use crate::services::dwell_timer::Scheduler;
use crate::services::storage::KeyValueStore;
use crate::services::tracker_state::{ReadStateTrait, TrackerState};
use crate::types::dom::{collect_feed_items, DomNode, FeedSelector};
use crate::types::errors::StoreError;
use crate::types::feed::{FeedItemId, ItemState, TimerKind};

/// Document query surface the engine needs from the host.
pub trait FeedDocument {
    /// Every feed item currently attached to the document, in document order.
    fn feed_items(&self) -> Vec<FeedItemId>;
    /// Starts viewport observation. Observing twice is harmless.
    fn observe(&mut self, id: &FeedItemId);
    fn unobserve(&mut self, id: &FeedItemId);
    /// Applies or removes the hidden-state marker.
    fn set_hidden(&mut self, id: &FeedItemId, hidden: bool);
    /// Items currently carrying the hidden-state marker.
    fn hidden_items(&self) -> Vec<FeedItemId>;
}

/// Counts from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Items seen by the sweep, after deduplication.
    pub scanned: usize,
    /// Items that were not tracked before.
    pub registered: usize,
    /// Items hidden because they were already read.
    pub restored: usize,
}

pub struct FeedSync {
    selector: FeedSelector,
    settle_delay: Duration,
    initial_sweep_done: bool,
}

impl FeedSync {
    pub fn new(selector: FeedSelector, settle_delay: Duration) -> Self {
        Self {
            selector,
            settle_delay,
            initial_sweep_done: false,
        }
    }

    pub fn initial_sweep_done(&self) -> bool {
        self.initial_sweep_done
    }

    /// Schedules the first whole-document sweep after the settle delay.
    pub fn schedule_initial_sweep<T: Scheduler + ?Sized>(&self, scheduler: &mut T) {
        scheduler.schedule(self.settle_delay, TimerKind::InitialSweep);
    }

    /// Scans the whole document. Runs once after the settle delay and again
    /// every time hiding is re-enabled.
    pub fn sweep_document<S, H>(
        &mut self,
        reconciler: &mut VisibilityReconciler,
        state: &mut TrackerState<S>,
        host: &mut H,
    ) -> Result<SweepReport, StoreError>
    where
        S: KeyValueStore,
        H: FeedDocument + Scheduler + ?Sized,
    {
        let ids = host.feed_items();
        let report = Self::register_all(&ids, reconciler, state, host)?;
        self.initial_sweep_done = true;
        info!(
            "event=document_sweep module=feed_sync status=ok scanned={} registered={} restored={}",
            report.scanned, report.registered, report.restored
        );
        Ok(report)
    }

    /// Registers every feed item inside a mutation batch's inserted subtrees.
    pub fn on_nodes_inserted<S, H>(
        &mut self,
        nodes: &[DomNode],
        reconciler: &mut VisibilityReconciler,
        state: &mut TrackerState<S>,
        host: &mut H,
    ) -> Result<SweepReport, StoreError>
    where
        S: KeyValueStore,
        H: FeedDocument + Scheduler + ?Sized,
    {
        let ids = collect_feed_items(nodes, &self.selector);
        let report = Self::register_all(&ids, reconciler, state, host)?;
        if report.scanned > 0 {
            debug!(
                "event=nodes_inserted module=feed_sync scanned={} registered={} restored={}",
                report.scanned, report.registered, report.restored
            );
        }
        Ok(report)
    }

    /// Drops every feed item inside removed subtrees from the arena.
    ///
    /// Pending dwell timers are left to fire; the reconciler ignores them.
    pub fn on_nodes_removed<H>(
        &mut self,
        nodes: &[DomNode],
        reconciler: &mut VisibilityReconciler,
        host: &mut H,
    ) -> usize
    where
        H: FeedDocument + ?Sized,
    {
        let mut forgotten = 0;
        for id in collect_feed_items(nodes, &self.selector) {
            if reconciler.forget(&id).is_some() {
                host.unobserve(&id);
                forgotten += 1;
            }
        }
        if forgotten > 0 {
            debug!("event=nodes_removed module=feed_sync forgotten={}", forgotten);
        }
        forgotten
    }

    fn register_all<S, H>(
        ids: &[FeedItemId],
        reconciler: &mut VisibilityReconciler,
        state: &mut TrackerState<S>,
        host: &mut H,
    ) -> Result<SweepReport, StoreError>
    where
        S: KeyValueStore,
        H: FeedDocument + Scheduler + ?Sized,
    {
        let mut report = SweepReport {
            scanned: ids.len(),
            ..SweepReport::default()
        };
        for id in ids {
            if reconciler.register(id) {
                host.observe(id);
                report.registered += 1;
            }
            let already_hidden = reconciler.state_of(id) == Some(ItemState::Hidden);
            if state.is_hiding_enabled() && state.contains(id) && !already_hidden {
                reconciler.hide(id, state, host)?;
                report.restored += 1;
            }
        }
        Ok(report)
    }
}
