//! Reconciler tests driven through the host mirror's ports.

use skimmed::host::HostMirror;
use skimmed::managers::visibility_reconciler::VisibilityReconciler;
use skimmed::services::dwell_timer::{DwellTimer, Scheduler};
use skimmed::services::storage::{KeyValueStore, MemoryStorage};
use skimmed::services::tracker_state::{ReadStateTrait, TrackerState};
use skimmed::types::event::IntersectionEntry;
use skimmed::types::feed::{FeedItemId, ItemState, TimerKind};
use skimmed::types::settings::{StoreSettings, TrackerSettings};

struct Fixture {
    reconciler: VisibilityReconciler,
    state: TrackerState<MemoryStorage>,
    host: HostMirror,
}

fn fixture(hiding_enabled: bool) -> Fixture {
    let mut storage = MemoryStorage::new();
    if hiding_enabled {
        storage.set("gm-hide-enabled", "true").unwrap();
    }
    Fixture {
        reconciler: VisibilityReconciler::new(DwellTimer::default(), 0.01),
        state: TrackerState::load(storage, &StoreSettings::default()),
        host: HostMirror::new(&TrackerSettings::default()),
    }
}

impl Fixture {
    fn track(&mut self, raw: &str) -> FeedItemId {
        let id = FeedItemId::from(raw);
        self.reconciler.register(&id);
        id
    }

    fn see(&mut self, entries: Vec<IntersectionEntry>) {
        self.reconciler
            .handle_intersections(&entries, &mut self.state, &mut self.host)
            .unwrap();
    }

    /// Fires every dwell timer due by `until_ms` on the mirror's clock.
    fn run_timers(&mut self, until_ms: u64) {
        while let Some(handle) = self.host.pop_due(until_ms) {
            if let Some(TimerKind::Dwell { item_id }) = self.host.take_fired(handle) {
                self.reconciler.handle_dwell_elapsed(&item_id, handle);
            }
        }
    }
}

#[test]
fn test_dwell_complete_while_visible_defers_hide() {
    let mut fx = fixture(true);
    let id = fx.track("1");

    fx.see(vec![IntersectionEntry::entered("1")]);
    fx.run_timers(1000);

    assert_eq!(fx.reconciler.state_of(&id), Some(ItemState::ConfirmedRead));
    assert!(!fx.host.is_hidden(&id));
    assert!(!fx.state.contains(&id));

    fx.see(vec![IntersectionEntry::left("1")]);
    assert_eq!(fx.reconciler.state_of(&id), Some(ItemState::Hidden));
    assert!(fx.host.is_hidden(&id));
    assert!(fx.state.contains(&id));
}

#[test]
fn test_exit_before_dwell_resets_item() {
    let mut fx = fixture(true);
    let id = fx.track("1");

    fx.see(vec![IntersectionEntry::entered("1")]);
    fx.run_timers(999);
    fx.see(vec![IntersectionEntry::left("1")]);
    fx.run_timers(5000);

    assert_eq!(fx.reconciler.state_of(&id), Some(ItemState::Unseen));
    assert_eq!(fx.state.read_count(), 0);
}

#[test]
fn test_threshold_boundary_counts_as_visible() {
    let mut fx = fixture(true);
    let id = fx.track("1");
    let other = fx.track("2");

    fx.see(vec![
        IntersectionEntry {
            item_id: Some("1".to_string()),
            ratio: 0.01,
        },
        IntersectionEntry {
            item_id: Some("2".to_string()),
            ratio: 0.005,
        },
    ]);

    assert!(matches!(
        fx.reconciler.state_of(&id),
        Some(ItemState::PendingConfirmation { .. })
    ));
    assert_eq!(fx.reconciler.state_of(&other), Some(ItemState::Unseen));
}

#[test]
fn test_entries_without_usable_id_are_skipped() {
    let mut fx = fixture(true);
    fx.track("1");

    fx.see(vec![
        IntersectionEntry {
            item_id: None,
            ratio: 1.0,
        },
        IntersectionEntry {
            item_id: Some(String::new()),
            ratio: 1.0,
        },
        IntersectionEntry::entered("unknown"),
    ]);

    assert_eq!(fx.host.pending_timers(), 0);
    assert!(!fx.reconciler.is_tracked(&FeedItemId::from("unknown")));
}

#[test]
fn test_entries_applied_in_delivery_order() {
    let mut fx = fixture(true);
    let id = fx.track("1");

    // Enter then leave inside one callback: the timer starts and is canceled.
    fx.see(vec![
        IntersectionEntry::entered("1"),
        IntersectionEntry::left("1"),
    ]);

    assert_eq!(fx.reconciler.state_of(&id), Some(ItemState::Unseen));
    assert_eq!(fx.host.pending_timers(), 0);
}

#[test]
fn test_repeated_enter_keeps_single_timer() {
    let mut fx = fixture(true);
    fx.track("1");

    fx.see(vec![IntersectionEntry::entered("1")]);
    fx.see(vec![IntersectionEntry::entered("1")]);

    assert_eq!(fx.host.pending_timers(), 1);
}

#[test]
fn test_confirmed_exit_while_disabled_is_not_recorded() {
    let mut fx = fixture(false);
    let id = fx.track("1");

    fx.see(vec![IntersectionEntry::entered("1")]);
    fx.run_timers(1000);
    fx.see(vec![IntersectionEntry::left("1")]);

    assert_eq!(fx.reconciler.state_of(&id), Some(ItemState::ConfirmedRead));
    assert!(!fx.state.contains(&id));
    assert!(!fx.host.is_hidden(&id));
}

#[test]
fn test_failed_write_leaves_item_unhidden() {
    let mut fx = fixture(true);
    let id = fx.track("1");

    fx.see(vec![IntersectionEntry::entered("1")]);
    fx.run_timers(1000);
    fx.state.storage_mut().set_fail_writes(true);

    let result = fx.reconciler.handle_intersections(
        &[IntersectionEntry::left("1")],
        &mut fx.state,
        &mut fx.host,
    );

    assert!(result.is_err());
    assert_eq!(fx.reconciler.state_of(&id), Some(ItemState::ConfirmedRead));
    assert!(!fx.host.is_hidden(&id));
}
