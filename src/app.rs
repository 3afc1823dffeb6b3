//! App Core for Skimmed.
//!
//! Central struct owning the persisted state, the managers and the host, and
//! routing host events to them strictly in arrival order.

use std::time::Duration;

use log::{debug, info};

use crate::host::{Host, HostMirror};
use crate::managers::affordance_installer::AffordanceInstaller;
use crate::managers::feed_sync::FeedSync;
use crate::managers::toggle_controller::ToggleController;
use crate::managers::visibility_reconciler::VisibilityReconciler;
use crate::services::dwell_timer::{DwellTimer, Scheduler};
use crate::services::storage::KeyValueStore;
use crate::services::tracker_state::{ReadStateTrait, TrackerState};
use crate::types::errors::TrackerError;
use crate::types::event::FeedEvent;
use crate::types::feed::{TimerHandle, TimerKind};
use crate::types::settings::TrackerSettings;

/// Central application struct holding all state and managers.
pub struct App<S: KeyValueStore, H: Host> {
    settings: TrackerSettings,
    state: TrackerState<S>,
    reconciler: VisibilityReconciler,
    feed_sync: FeedSync,
    toggle: ToggleController,
    affordance: AffordanceInstaller,
    host: H,
}

impl<S: KeyValueStore, H: Host> App<S, H> {
    /// Creates the app, rehydrating the read store and the enabled flag.
    ///
    /// Nothing is scheduled until [`App::start`].
    pub fn new(storage: S, host: H, settings: TrackerSettings) -> Result<Self, TrackerError> {
        settings.validate()?;

        let state = TrackerState::load(storage, &settings.store);
        let dwell = DwellTimer::new(Duration::from_millis(settings.dwell.dwell_ms));
        let reconciler = VisibilityReconciler::new(dwell, settings.dwell.visibility_threshold);
        let feed_sync = FeedSync::new(
            settings.feed.selector.clone(),
            Duration::from_millis(settings.feed.settle_delay_ms),
        );
        let affordance = AffordanceInstaller::new(&settings.affordance);

        Ok(Self {
            settings,
            state,
            reconciler,
            feed_sync,
            toggle: ToggleController::new(),
            affordance,
            host,
        })
    }

    /// Schedules the initial sweep and the affordance attempts.
    pub fn start(&mut self) {
        self.feed_sync.schedule_initial_sweep(&mut self.host);
        self.affordance.schedule_retries(&mut self.host);
        info!(
            "event=app_start module=app status=ok hiding_enabled={} read_ids={}",
            self.state.is_hiding_enabled(),
            self.state.read_count()
        );
    }

    /// Handles one host event.
    ///
    /// Only storage writes fail. Whatever the event changed before the
    /// failure stays applied.
    pub fn handle_event(&mut self, event: FeedEvent) -> Result<(), TrackerError> {
        self.host.sync_document(&event);

        match event {
            FeedEvent::DocumentSnapshot { .. } => {}
            FeedEvent::NodesInserted { nodes } => {
                self.feed_sync.on_nodes_inserted(
                    &nodes,
                    &mut self.reconciler,
                    &mut self.state,
                    &mut self.host,
                )?;
                if self.affordance.panel_appeared(&nodes) {
                    self.try_install_affordance();
                }
            }
            FeedEvent::NodesRemoved { nodes } => {
                self.feed_sync
                    .on_nodes_removed(&nodes, &mut self.reconciler, &mut self.host);
            }
            FeedEvent::Intersection { entries } => {
                self.reconciler
                    .handle_intersections(&entries, &mut self.state, &mut self.host)?;
            }
            FeedEvent::TimerFired { handle } => self.on_timer_fired(handle)?,
            FeedEvent::ToggleRequested => {
                self.toggle.toggle(
                    &mut self.state,
                    &mut self.reconciler,
                    &mut self.feed_sync,
                    &mut self.host,
                )?;
            }
        }
        Ok(())
    }

    fn on_timer_fired(&mut self, handle: TimerHandle) -> Result<(), TrackerError> {
        let Some(kind) = self.host.take_fired(handle) else {
            debug!(
                "event=timer_fired module=app handle={} status=stale",
                handle.0
            );
            return Ok(());
        };
        match kind {
            TimerKind::Dwell { item_id } => {
                self.reconciler.handle_dwell_elapsed(&item_id, handle);
            }
            TimerKind::InitialSweep => {
                self.feed_sync
                    .sweep_document(&mut self.reconciler, &mut self.state, &mut self.host)?;
            }
            TimerKind::AffordanceRetry { attempt } => {
                debug!("event=affordance_retry module=app attempt={}", attempt);
                self.try_install_affordance();
            }
        }
        Ok(())
    }

    fn try_install_affordance(&mut self) {
        let enabled = self.state.is_hiding_enabled();
        // Failures are logged by the installer and retried on the next trigger.
        let _ = self.affordance.try_install(&mut self.host, enabled);
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    pub fn state(&self) -> &TrackerState<S> {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut TrackerState<S> {
        &mut self.state
    }

    pub fn reconciler(&self) -> &VisibilityReconciler {
        &self.reconciler
    }

    pub fn feed_sync(&self) -> &FeedSync {
        &self.feed_sync
    }

    pub fn affordance(&self) -> &AffordanceInstaller {
        &self.affordance
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn is_hiding_enabled(&self) -> bool {
        self.state.is_hiding_enabled()
    }

    /// Tears the app down, handing back its storage.
    pub fn into_storage(self) -> S {
        self.state.into_storage()
    }
}

impl<S: KeyValueStore> App<S, HostMirror> {
    /// Runs the mirror's virtual clock forward by `ms`, dispatching every
    /// timer that comes due, including timers scheduled along the way.
    ///
    /// Returns how many timers fired.
    pub fn advance_clock(&mut self, ms: u64) -> Result<usize, TrackerError> {
        let until = self.host.now_ms().saturating_add(ms);
        let mut fired = 0;
        while let Some(handle) = self.host.pop_due(until) {
            self.handle_event(FeedEvent::TimerFired { handle })?;
            fired += 1;
        }
        self.host.set_now(until);
        Ok(fired)
    }
}
