// Skimmed paths on Linux, following the XDG base directory layout.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "skimmed";

fn home() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// `$<xdg_var>/skimmed` when the variable is set and non-empty, else `~/<fallback>/skimmed`.
fn xdg_dir(xdg: Option<String>, fallback: &[&str]) -> PathBuf {
    match xdg.filter(|value| !value.is_empty()) {
        Some(base) => PathBuf::from(base).join(APP_DIR),
        None => fallback
            .iter()
            .fold(home(), |path, part| path.join(part))
            .join(APP_DIR),
    }
}

pub fn get_config_dir() -> PathBuf {
    xdg_dir(env::var("XDG_CONFIG_HOME").ok(), &[".config"])
}

pub fn get_data_dir() -> PathBuf {
    xdg_dir(env::var("XDG_DATA_HOME").ok(), &[".local", "share"])
}
