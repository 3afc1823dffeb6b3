// Skimmed paths on Windows.

use std::env;
use std::path::PathBuf;

fn app_root(var: &str, default: &str) -> PathBuf {
    PathBuf::from(env::var(var).unwrap_or_else(|_| String::from(default))).join("Skimmed")
}

/// `%APPDATA%/Skimmed/config`, roaming with the user profile.
pub fn get_config_dir() -> PathBuf {
    app_root("APPDATA", "C:\\Users\\Default\\AppData\\Roaming").join("config")
}

/// `%LOCALAPPDATA%/Skimmed/data`, kept on this machine.
pub fn get_data_dir() -> PathBuf {
    app_root("LOCALAPPDATA", "C:\\Users\\Default\\AppData\\Local").join("data")
}
