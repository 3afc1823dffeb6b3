// Skimmed platform paths
// Resolves where the settings file, the SQLite store and the logs live on
// Windows, macOS and Linux. The implementation is picked with `cfg(target_os)`.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Directory holding `settings.json`.
///
/// - **Linux**: `$XDG_CONFIG_HOME/skimmed`, else `~/.config/skimmed`
/// - **macOS**: `~/Library/Preferences/Skimmed`
/// - **Windows**: `%APPDATA%/Skimmed/config`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Directory holding `skimmed.db` and the `logs/` folder.
///
/// - **Linux**: `$XDG_DATA_HOME/skimmed`, else `~/.local/share/skimmed`
/// - **macOS**: `~/Library/Application Support/Skimmed`
/// - **Windows**: `%LOCALAPPDATA%/Skimmed/data`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}
