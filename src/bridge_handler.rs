//! Request handler for the Skimmed JSON-lines bridge.
//!
//! Kept apart from `bridge_server.rs` so the protocol can be tested without
//! a process. Each request carries one [`FeedEvent`]; the response carries
//! every [`HostCommand`] the event produced.

use log::warn;
use serde_json::{json, Value};

use crate::app::App;
use crate::host::HostMirror;
use crate::services::storage::{KeyValueStore, SqliteStorage};
use crate::types::errors::BridgeError;
use crate::types::event::{FeedEvent, HostCommand};

/// The app as the bridge binary runs it.
pub type BridgeApp = App<SqliteStorage, HostMirror>;

/// Starts the app and builds the `ready` message carrying the start-up commands.
pub fn ready_message<S: KeyValueStore>(app: &mut App<S, HostMirror>) -> Value {
    app.start();
    let commands = app.host_mut().drain_commands();
    json!({
        "event": "ready",
        "version": env!("CARGO_PKG_VERSION"),
        "commands": commands,
    })
}

/// Handles one raw input line.
pub fn handle_line<S: KeyValueStore>(app: &mut App<S, HostMirror>, line: &str) -> Value {
    match serde_json::from_str::<Value>(line) {
        Ok(request) => handle_request(app, &request),
        Err(e) => json!({"id": null, "error": BridgeError::Parse(e.to_string()).to_string()}),
    }
}

/// Handles one parsed request `{"id": ..., "event": {...}}`.
///
/// When handling fails part-way, the commands produced before the failure
/// are still returned next to the error.
pub fn handle_request<S: KeyValueStore>(app: &mut App<S, HostMirror>, request: &Value) -> Value {
    let id = request.get("id").cloned().unwrap_or(Value::Null);

    let event = match parse_event(request) {
        Ok(event) => event,
        Err(err) => return json!({"id": id, "error": err.to_string()}),
    };

    match dispatch(app, event) {
        Ok(commands) => json!({"id": id, "commands": commands}),
        Err((err, commands)) => {
            warn!("event=bridge_dispatch module=bridge status=error error={}", err);
            json!({"id": id, "error": err.to_string(), "commands": commands})
        }
    }
}

fn parse_event(request: &Value) -> Result<FeedEvent, BridgeError> {
    let raw = request
        .get("event")
        .cloned()
        .ok_or_else(|| BridgeError::Parse("missing event".to_string()))?;
    serde_json::from_value(raw).map_err(|e| BridgeError::Parse(e.to_string()))
}

fn dispatch<S: KeyValueStore>(
    app: &mut App<S, HostMirror>,
    event: FeedEvent,
) -> Result<Vec<HostCommand>, (BridgeError, Vec<HostCommand>)> {
    let result = app.handle_event(event);
    let commands = app.host_mut().drain_commands();
    match result {
        Ok(()) => Ok(commands),
        Err(e) => Err((BridgeError::Dispatch(e.to_string()), commands)),
    }
}
