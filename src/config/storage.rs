//! Storage location resolution.
//!
//! The state file path comes from `LEDGER_STORAGE_PATH` when set, then from the
//! `[storage]` section of config.toml.

use super::settings::StorageSettings;
use std::path::PathBuf;

/// Environment variable that overrides the configured storage path.
pub const STORAGE_PATH_VAR: &str = "LEDGER_STORAGE_PATH";

/// Key under which the dashboard state is stored.
pub const STORAGE_NAME: &str = "admin-dashboard";

/// Gets the storage path from the environment variable or returns the configured one.
#[must_use]
pub fn get_storage_path(settings: &StorageSettings) -> PathBuf {
    resolve_storage_path(std::env::var(STORAGE_PATH_VAR).ok(), settings)
}

fn resolve_storage_path(override_path: Option<String>, settings: &StorageSettings) -> PathBuf {
    override_path
        .filter(|p| !p.trim().is_empty())
        .map_or_else(|| settings.path.clone(), PathBuf::from)
}
