//! Affordance installation through the app: fixed retries and panel arrival.

use skimmed::app::App;
use skimmed::host::HostMirror;
use skimmed::services::storage::MemoryStorage;
use skimmed::types::dom::DomNode;
use skimmed::types::event::{FeedEvent, HostCommand};
use skimmed::types::settings::TrackerSettings;

fn app() -> App<MemoryStorage, HostMirror> {
    let settings = TrackerSettings::default();
    let host = HostMirror::new(&settings);
    App::new(MemoryStorage::new(), host, settings).unwrap()
}

fn drawer() -> DomNode {
    DomNode::new("nav")
        .with_child(
            DomNode::new("a")
                .with_attribute("class", "drawer__tab")
                .with_attribute("href", "/notifications"),
        )
        .with_child(
            DomNode::new("a")
                .with_attribute("class", "drawer__tab")
                .with_attribute("href", "/auth/sign_out"),
        )
}

fn inserts(commands: &[HostCommand]) -> usize {
    commands
        .iter()
        .filter(|c| matches!(c, HostCommand::InsertToggle { .. }))
        .count()
}

#[test]
fn test_start_schedules_fixed_retries() {
    let mut app = app();
    app.start();
    let delays: Vec<u64> = app
        .host_mut()
        .drain_commands()
        .into_iter()
        .filter_map(|c| match c {
            HostCommand::ScheduleTimer { delay_ms, .. } => Some(delay_ms),
            _ => None,
        })
        .collect();
    assert_eq!(delays, vec![1000, 500, 2000, 5000]);
}

#[test]
fn test_retry_installs_once_panel_is_rendered() {
    let mut app = app();
    app.start();
    app.handle_event(FeedEvent::DocumentSnapshot {
        roots: vec![drawer()],
    })
    .unwrap();
    app.host_mut().drain_commands();

    app.advance_clock(500).unwrap();
    let commands = app.host_mut().drain_commands();
    assert_eq!(
        commands,
        vec![HostCommand::InsertToggle {
            anchor: "/auth/sign_out".to_string(),
            affordance_id: "gm-hide-btn".to_string(),
            enabled: false,
        }]
    );

    // Later attempts find it already there.
    app.advance_clock(10_000).unwrap();
    assert_eq!(inserts(&app.host_mut().drain_commands()), 0);
    assert!(app.affordance().is_installed());
}

#[test]
fn test_panel_arrival_triggers_immediate_attempt() {
    let mut app = app();
    app.start();
    app.advance_clock(5000).unwrap();
    assert!(!app.affordance().is_installed());

    app.handle_event(FeedEvent::NodesInserted {
        nodes: vec![drawer()],
    })
    .unwrap();
    assert_eq!(inserts(&app.host_mut().drain_commands()), 1);
}

#[test]
fn test_panel_without_anchor_is_not_installed() {
    let mut app = app();
    let panel = DomNode::new("nav").with_child(
        DomNode::new("a")
            .with_attribute("class", "drawer__tab")
            .with_attribute("href", "/settings"),
    );
    app.handle_event(FeedEvent::NodesInserted { nodes: vec![panel] })
        .unwrap();
    assert!(!app.affordance().is_installed());
}

#[test]
fn test_existing_affordance_in_document_is_respected() {
    let mut app = app();
    let page = drawer().with_child(DomNode::new("button").with_attribute("id", "gm-hide-btn"));
    app.handle_event(FeedEvent::NodesInserted { nodes: vec![page] })
        .unwrap();
    assert_eq!(inserts(&app.host_mut().drain_commands()), 0);
}

#[test]
fn test_toggle_rerenders_installed_affordance() {
    let mut app = app();
    app.handle_event(FeedEvent::NodesInserted {
        nodes: vec![drawer()],
    })
    .unwrap();
    app.host_mut().drain_commands();

    app.handle_event(FeedEvent::ToggleRequested).unwrap();
    let commands = app.host_mut().drain_commands();
    assert_eq!(commands.first(), Some(&HostCommand::RenderToggle { enabled: true }));
}

#[test]
fn test_rerendered_drawer_gets_affordance_again() {
    let mut app = app();
    app.handle_event(FeedEvent::NodesInserted {
        nodes: vec![drawer()],
    })
    .unwrap();
    assert_eq!(inserts(&app.host_mut().drain_commands()), 1);

    app.handle_event(FeedEvent::NodesRemoved {
        nodes: vec![drawer()],
    })
    .unwrap();
    // No button to redraw while the drawer is gone.
    app.handle_event(FeedEvent::ToggleRequested).unwrap();
    assert!(!app
        .host_mut()
        .drain_commands()
        .iter()
        .any(|c| matches!(c, HostCommand::RenderToggle { .. })));

    app.handle_event(FeedEvent::NodesInserted {
        nodes: vec![drawer()],
    })
    .unwrap();
    let commands = app.host_mut().drain_commands();
    assert_eq!(
        commands,
        vec![HostCommand::InsertToggle {
            anchor: "/auth/sign_out".to_string(),
            affordance_id: "gm-hide-btn".to_string(),
            enabled: true,
        }]
    );
}
