//! Whole-state JSON snapshots for backup and restore.
//!
//! An export is the pretty-printed [`Store`]. An import must be a JSON object with a
//! `transactions` array; every other collection may be absent and defaults to empty.
//! Import is all-or-nothing: any failure comes back as
//! [`Error::MalformedImport`] and produces no partial state.

use crate::{
    errors::{Error, Result},
    store::Store,
};
use chrono::NaiveDate;
use serde_json::Value;
use tracing::info;

/// Prefix of exported backup file names.
pub const BACKUP_PREFIX: &str = "finance_tracker_backup_";

/// Serializes the full state to pretty JSON.
///
/// # Errors
/// Returns [`Error::Json`] if serialization fails.
pub fn export_snapshot(store: &Store) -> Result<String> {
    let document = serde_json::to_string_pretty(store)?;
    info!(
        transactions = store.transactions.len(),
        projects = store.projects.len(),
        "Exported snapshot"
    );
    Ok(document)
}

/// Parses a snapshot document into a fresh store.
///
/// # Errors
/// Returns [`Error::MalformedImport`] when `document` is not JSON, is not an object,
/// lacks a `transactions` array, or has records of the wrong shape.
pub fn import_snapshot(document: &str) -> Result<Store> {
    let value: Value = serde_json::from_str(document).map_err(|e| Error::MalformedImport {
        message: format!("not valid JSON: {e}"),
    })?;

    let Some(root) = value.as_object() else {
        return Err(Error::MalformedImport {
            message: "expected a JSON object at the top level".to_string(),
        });
    };
    if !root.get("transactions").is_some_and(Value::is_array) {
        return Err(Error::MalformedImport {
            message: "missing `transactions` array".to_string(),
        });
    }

    let store: Store = serde_json::from_value(value).map_err(|e| Error::MalformedImport {
        message: e.to_string(),
    })?;
    info!(
        transactions = store.transactions.len(),
        projects = store.projects.len(),
        partners = store.partners.len(),
        "Imported snapshot"
    );
    Ok(store)
}

/// File name of a backup taken on `date`, e.g. `finance_tracker_backup_2024-06-30.json`.
#[must_use]
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("{BACKUP_PREFIX}{}.json", date.format(super::dates::ISO_DATE))
}
