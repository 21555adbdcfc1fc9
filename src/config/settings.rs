//! Application settings loading from config.toml
//!
//! Every section and key is optional. A missing file means all defaults; a file that
//! exists but does not parse is a configuration error.

use crate::core::dues::OverpaymentPolicy;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default location of the persisted ledger state.
pub const DEFAULT_STORAGE_PATH: &str = "data/admin-dashboard.json";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the ledger state is persisted
    pub storage: StorageSettings,
    /// Ledger behaviour
    pub ledger: LedgerSettings,
    /// Dashboard display preferences
    pub display: DisplaySettings,
}

/// `[storage]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Path of the JSON state file
    pub path: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORAGE_PATH),
        }
    }
}

/// `[ledger]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    /// Record payments larger than a due's remaining balance instead of refusing them
    pub allow_overpayment: bool,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            allow_overpayment: true,
        }
    }
}

impl LedgerSettings {
    /// The overpayment policy these settings select.
    #[must_use]
    pub const fn overpayment_policy(&self) -> OverpaymentPolicy {
        OverpaymentPolicy::from_flag(self.allow_overpayment)
    }
}

/// `[display]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Symbol prefixed to currency amounts
    pub currency_symbol: String,
    /// Number of entries in the recent transactions list
    pub recent_limit: usize,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            recent_limit: 5,
        }
    }
}

/// Parses settings from TOML text.
///
/// # Errors
/// Returns [`Error::Config`] if the TOML is invalid or a key has the wrong type.
pub fn parse_config(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

/// Loads settings from `path`, or the defaults when the file does not exist.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No config file at {:?}; using defaults", path);
        return Ok(Settings::default());
    }
    load_config(path)
}

/// Loads settings from the default location (./config.toml)
///
/// # Errors
/// Returns an error if ./config.toml exists but cannot be read or parsed.
pub fn load_default_config() -> Result<Settings> {
    load_config_or_default("config.toml")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::scratch_dir;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [storage]
            path = "/var/lib/site-ledger/state.json"

            [ledger]
            allow_overpayment = false

            [display]
            currency_symbol = "₹"
            recent_limit = 10
        "#;

        let settings = parse_config(toml_str).unwrap();
        assert_eq!(
            settings.storage.path,
            PathBuf::from("/var/lib/site-ledger/state.json")
        );
        assert!(!settings.ledger.allow_overpayment);
        assert_eq!(settings.ledger.overpayment_policy(), OverpaymentPolicy::Reject);
        assert_eq!(settings.display.currency_symbol, "₹");
        assert_eq!(settings.display.recent_limit, 10);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let settings = parse_config("[display]\nrecent_limit = 3\n").unwrap();
        assert_eq!(settings.storage.path, PathBuf::from(DEFAULT_STORAGE_PATH));
        assert_eq!(settings.ledger.overpayment_policy(), OverpaymentPolicy::Allow);
        assert_eq!(settings.display.currency_symbol, "$");
        assert_eq!(settings.display.recent_limit, 3);

        assert_eq!(parse_config("").unwrap(), Settings::default());
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(matches!(
            parse_config("[ledger]\nallow_overpayment = \"sometimes\""),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            parse_config("this is not toml"),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let path = scratch_dir().join("config.toml");
        assert_eq!(load_config_or_default(&path).unwrap(), Settings::default());
        assert!(matches!(load_config(&path), Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[storage]\npath = \"ledger.json\"\n").unwrap();

        let settings = load_config_or_default(&path).unwrap();
        assert_eq!(settings.storage.path, PathBuf::from("ledger.json"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
