//! Toggle Controller.
//!
//! Flips the persisted enabled flag. Turning hiding off reveals every hidden
//! item without touching the read store; turning it on re-sweeps the
//! document so read items are hidden again.

use log::info;

use crate::managers::affordance_installer::HostUi;
use crate::managers::feed_sync::{FeedDocument, FeedSync};
use crate::managers::visibility_reconciler::VisibilityReconciler;
use crate::services::dwell_timer::Scheduler;
use crate::services::storage::KeyValueStore;
use crate::services::tracker_state::{ReadStateTrait, TrackerState};
use crate::types::errors::StoreError;

#[derive(Debug, Default)]
pub struct ToggleController;

impl ToggleController {
    pub fn new() -> Self {
        Self
    }

    /// Flips hiding and returns the new value.
    ///
    /// If persisting the flag fails the error is returned before anything is
    /// re-rendered, revealed or re-hidden.
    pub fn toggle<S, H>(
        &self,
        state: &mut TrackerState<S>,
        reconciler: &mut VisibilityReconciler,
        feed_sync: &mut FeedSync,
        host: &mut H,
    ) -> Result<bool, StoreError>
    where
        S: KeyValueStore,
        H: FeedDocument + Scheduler + HostUi + ?Sized,
    {
        let enabled = !state.is_hiding_enabled();
        state.set_hiding_enabled(enabled)?;
        host.render_affordance(enabled);

        if enabled {
            let report = feed_sync.sweep_document(reconciler, state, host)?;
            // Read while hiding was off and already scrolled past.
            let stragglers = reconciler.confirmed_out_of_view();
            for id in &stragglers {
                reconciler.hide(id, state, host)?;
            }
            info!(
                "event=toggle module=toggle enabled=true restored={} stragglers={}",
                report.restored,
                stragglers.len()
            );
        } else {
            let revealed = Self::reveal_all(reconciler, host);
            info!("event=toggle module=toggle enabled=false revealed={}", revealed);
        }
        Ok(enabled)
    }

    /// Removes the hidden-state marker from every item bearing it.
    fn reveal_all<H: FeedDocument + ?Sized>(reconciler: &mut VisibilityReconciler, host: &mut H) -> usize {
        let hidden = host.hidden_items();
        for id in &hidden {
            host.set_hidden(id, false);
        }
        reconciler.mark_all_revealed();
        hidden.len()
    }
}
