//! End-to-end tests of the app dispatcher over the host mirror.

use skimmed::app::App;
use skimmed::host::HostMirror;
use skimmed::services::storage::{KeyValueStore, MemoryStorage, SqliteStorage};
use skimmed::services::tracker_state::ReadStateTrait;
use skimmed::types::dom::DomNode;
use skimmed::types::errors::TrackerError;
use skimmed::types::event::{FeedEvent, HostCommand, IntersectionEntry};
use skimmed::types::feed::{FeedItemId, TimerHandle};
use skimmed::types::settings::TrackerSettings;
use tempfile::TempDir;

fn enabled_storage() -> MemoryStorage {
    let mut storage = MemoryStorage::new();
    storage.set("gm-hide-enabled", "true").unwrap();
    storage
}

fn build<S: KeyValueStore>(storage: S) -> App<S, HostMirror> {
    let settings = TrackerSettings::default();
    let host = HostMirror::new(&settings);
    App::new(storage, host, settings).unwrap()
}

fn read_and_scroll_past<S: KeyValueStore>(app: &mut App<S, HostMirror>, id: &str) {
    app.handle_event(FeedEvent::NodesInserted {
        nodes: vec![DomNode::feed_item(id)],
    })
    .unwrap();
    app.handle_event(FeedEvent::Intersection {
        entries: vec![IntersectionEntry::entered(id)],
    })
    .unwrap();
    app.advance_clock(1000).unwrap();
    app.handle_event(FeedEvent::Intersection {
        entries: vec![IntersectionEntry::left(id)],
    })
    .unwrap();
}

#[test]
fn test_invalid_settings_rejected() {
    let mut settings = TrackerSettings::default();
    settings.dwell.visibility_threshold = 0.0;
    let host = HostMirror::new(&settings);
    let result = App::new(MemoryStorage::new(), host, settings);
    assert!(matches!(result, Err(TrackerError::Settings(_))));
}

#[test]
fn test_read_item_hidden_with_class_after_scrolling_past() {
    let mut app = build(enabled_storage());
    read_and_scroll_past(&mut app, "42");

    let commands = app.host_mut().drain_commands();
    assert!(commands.contains(&HostCommand::Hide {
        id: FeedItemId::from("42"),
        class: "gm-post-hidden".to_string(),
    }));
    assert_eq!(
        app.state().storage().get("gm-read-posts").unwrap().as_deref(),
        Some(r#"["42"]"#)
    );
}

#[test]
fn test_host_fired_timer_confirms_dwell() {
    let mut app = build(enabled_storage());
    app.handle_event(FeedEvent::NodesInserted {
        nodes: vec![DomNode::feed_item("1")],
    })
    .unwrap();
    app.host_mut().drain_commands();
    app.handle_event(FeedEvent::Intersection {
        entries: vec![IntersectionEntry::entered("1")],
    })
    .unwrap();

    let handle = match app.host_mut().drain_commands().as_slice() {
        [HostCommand::ScheduleTimer { handle, delay_ms: 1000 }] => *handle,
        other => panic!("unexpected commands: {:?}", other),
    };

    // The host's own timer fires; the virtual clock never moved.
    app.handle_event(FeedEvent::TimerFired { handle }).unwrap();
    // A duplicate delivery is ignored.
    app.handle_event(FeedEvent::TimerFired { handle }).unwrap();
    app.handle_event(FeedEvent::Intersection {
        entries: vec![IntersectionEntry::left("1")],
    })
    .unwrap();

    assert!(app.state().contains(&FeedItemId::from("1")));
}

#[test]
fn test_unknown_timer_handle_is_noop() {
    let mut app = build(enabled_storage());
    app.handle_event(FeedEvent::TimerFired {
        handle: TimerHandle(999),
    })
    .unwrap();
    assert!(app.host_mut().drain_commands().is_empty());
}

#[test]
fn test_exit_cancels_host_timer() {
    let mut app = build(enabled_storage());
    app.handle_event(FeedEvent::NodesInserted {
        nodes: vec![DomNode::feed_item("1")],
    })
    .unwrap();
    app.handle_event(FeedEvent::Intersection {
        entries: vec![IntersectionEntry::entered("1")],
    })
    .unwrap();
    app.handle_event(FeedEvent::Intersection {
        entries: vec![IntersectionEntry::left("1")],
    })
    .unwrap();

    let commands = app.host_mut().drain_commands();
    assert!(matches!(commands.last(), Some(HostCommand::CancelTimer { .. })));
    assert_eq!(app.host().pending_timers(), 0);
}

#[test]
fn test_storage_failure_surfaces_from_dispatch() {
    let mut app = build(enabled_storage());
    app.handle_event(FeedEvent::NodesInserted {
        nodes: vec![DomNode::feed_item("1")],
    })
    .unwrap();
    app.handle_event(FeedEvent::Intersection {
        entries: vec![IntersectionEntry::entered("1")],
    })
    .unwrap();
    app.advance_clock(1000).unwrap();
    app.state_mut().storage_mut().set_fail_writes(true);

    let result = app.handle_event(FeedEvent::Intersection {
        entries: vec![IntersectionEntry::left("1")],
    });
    assert!(matches!(result, Err(TrackerError::Store(_))));
    assert!(!app.host().is_hidden(&FeedItemId::from("1")));
}

#[test]
fn test_next_session_hides_what_this_one_read() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("skimmed.db");

    {
        let mut storage = SqliteStorage::open(&db_path).unwrap();
        storage.set("gm-hide-enabled", "true").unwrap();
        let mut app = build(storage);
        read_and_scroll_past(&mut app, "42");
    }

    let mut app = build(SqliteStorage::open(&db_path).unwrap());
    assert!(app.is_hiding_enabled());
    app.handle_event(FeedEvent::NodesInserted {
        nodes: vec![DomNode::feed_item("42")],
    })
    .unwrap();
    assert!(app.host().is_hidden(&FeedItemId::from("42")));
}
