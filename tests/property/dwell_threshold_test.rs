//! Property-based tests for the dwell threshold, run against the app's
//! virtual clock.

use proptest::prelude::*;
use skimmed::app::App;
use skimmed::host::HostMirror;
use skimmed::services::storage::{KeyValueStore, MemoryStorage};
use skimmed::services::tracker_state::ReadStateTrait;
use skimmed::types::dom::DomNode;
use skimmed::types::event::{FeedEvent, IntersectionEntry};
use skimmed::types::feed::FeedItemId;
use skimmed::types::settings::TrackerSettings;

fn enabled_app() -> App<MemoryStorage, HostMirror> {
    let mut storage = MemoryStorage::new();
    storage.set("gm-hide-enabled", "true").unwrap();
    let settings = TrackerSettings::default();
    let host = HostMirror::new(&settings);
    let mut app = App::new(storage, host, settings).unwrap();
    app.handle_event(FeedEvent::NodesInserted {
        nodes: vec![DomNode::feed_item("7")],
    })
    .unwrap();
    app
}

fn visit(app: &mut App<MemoryStorage, HostMirror>, visible_ms: u64, gap_ms: u64) {
    app.handle_event(FeedEvent::Intersection {
        entries: vec![IntersectionEntry::entered("7")],
    })
    .unwrap();
    app.advance_clock(visible_ms).unwrap();
    app.handle_event(FeedEvent::Intersection {
        entries: vec![IntersectionEntry::left("7")],
    })
    .unwrap();
    app.advance_clock(gap_ms).unwrap();
}

proptest! {
    #[test]
    fn single_visit_recorded_iff_dwell_reached(visible_ms in 0u64..3000) {
        let mut app = enabled_app();
        visit(&mut app, visible_ms, 5000);

        let id = FeedItemId::from("7");
        let recorded = app.state().contains(&id);
        prop_assert_eq!(recorded, visible_ms >= 1000);
        prop_assert_eq!(app.host().is_hidden(&id), recorded);
    }

    #[test]
    fn short_visits_never_accumulate(visits in prop::collection::vec((0u64..1000, 0u64..3000), 1..8)) {
        let mut app = enabled_app();
        for (visible_ms, gap_ms) in visits {
            visit(&mut app, visible_ms, gap_ms);
        }
        prop_assert_eq!(app.state().read_count(), 0);
    }
}
