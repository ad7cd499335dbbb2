mod config;
pub mod database;
mod memory;

pub use config::{Config, TimerConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// Key under which the event collection is persisted.
pub const EVENTS_KEY: &str = "events:v1";
/// Key under which the language preference is persisted.
pub const LANGUAGE_KEY: &str = "lang:v1";

/// Durable string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Returns the data directory.
///
/// `POMOCAL_DATA_DIR` wins if set. Otherwise `~/.config/pomocal[-dev]/`
/// based on POMOCAL_ENV (set POMOCAL_ENV=dev for development data).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("POMOCAL_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("POMOCAL_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomocal-dev")
            } else {
                base_dir.join("pomocal")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
