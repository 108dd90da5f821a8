mod config;
pub mod database;
pub mod state;

pub use config::{Config, DisplayConfig, RngConfig};
pub use database::{Database, RelapseRecord};
pub use state::{LoadedState, MemoryStore, PersistedState, StateStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `SOBERSTREAK_DATA_DIR` overrides the location outright. Otherwise the
/// directory is `~/.config/soberstreak[-dev]/`, with the `-dev` suffix
/// selected by `SOBERSTREAK_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("SOBERSTREAK_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env =
                std::env::var("SOBERSTREAK_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("soberstreak-dev")
            } else {
                base_dir.join("soberstreak")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
