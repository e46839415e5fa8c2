//! Locations under the replay-devtools data directory

use std::path::PathBuf;
use std::sync::OnceLock;

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Set the data directory, or use `~/.replay-devtools` when `custom_path` is
/// None. Call before any other path function; later calls are ignored.
pub fn init_data_dir(custom_path: Option<PathBuf>) {
    let path = custom_path.unwrap_or_else(default_data_dir);
    if DATA_DIR.set(path.clone()).is_err() {
        tracing::debug!(path = %path.display(), "Data directory already initialized");
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".replay-devtools"))
        .unwrap_or_else(|| PathBuf::from(".replay-devtools"))
}

pub fn data_dir() -> PathBuf {
    DATA_DIR.get().cloned().unwrap_or_else(default_data_dir)
}

pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

pub fn log_file_path() -> PathBuf {
    logs_dir().join("replay-devtools.log")
}

pub fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}
