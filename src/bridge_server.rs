//! Skimmed bridge: the engine over stdin/stdout for a page-side host script.
//!
//! Protocol: one JSON object per line.
//! Request:  {"id":1, "event":{"event":"intersection","entries":[...]}}
//! Response: {"id":1, "commands":[...]} or {"id":1, "error":"..."}

use std::error::Error;
use std::io::{self, BufRead, Write};

use log::{info, warn};

use skimmed::app::App;
use skimmed::bridge_handler::{handle_line, ready_message, BridgeApp};
use skimmed::host::HostMirror;
use skimmed::logging::init_logging;
use skimmed::platform;
use skimmed::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use skimmed::services::storage::SqliteStorage;
use skimmed::types::settings::TrackerSettings;

fn main() -> Result<(), Box<dyn Error>> {
    let mut engine = SettingsEngine::new(None);
    let (settings, settings_error) = match engine.load() {
        Ok(settings) => (settings, None),
        Err(e) => (TrackerSettings::default(), Some(e)),
    };

    let data_dir = platform::get_data_dir();
    if let Err(e) = init_logging(&settings.logging.level, &data_dir.join("logs")) {
        eprintln!("skimmed-bridge: logging disabled: {}", e);
    }
    if let Some(e) = settings_error {
        warn!(
            "event=settings_load module=bridge status=fallback path={} error={}",
            engine.get_config_path(),
            e
        );
    }

    std::fs::create_dir_all(&data_dir)?;
    let storage = SqliteStorage::open(data_dir.join("skimmed.db"))?;
    let host = HostMirror::new(&settings);
    let mut app: BridgeApp = App::new(storage, host, settings)?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", ready_message(&mut app))?;
    stdout.flush()?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(&mut app, &line);
        writeln!(stdout, "{}", response)?;
        stdout.flush()?;
    }

    info!("event=bridge_stop module=bridge status=ok");
    Ok(())
}
