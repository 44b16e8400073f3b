//! Upsert options.

use serde::{Deserialize, Serialize};

use crate::value::DATETIME_FORMAT;

/// Column conventions and behavior switches for [`UpsertManager`](crate::UpsertManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpsertOptions {
    /// Identifier column, never updated on conflict.
    pub id_column: String,
    /// Creation timestamp column, never updated on conflict.
    pub create_time_column: String,
    /// Update timestamp column, set to the current time on conflict.
    pub update_time_column: String,
    /// `chrono` format of the update timestamp.
    pub timestamp_format: String,
    /// Return the caller's entity instead of re-fetching it on SQLite.
    pub skip_refetch_on_sqlite: bool,
}

impl Default for UpsertOptions {
    fn default() -> Self {
        Self {
            id_column: String::from("id"),
            create_time_column: String::from("create_time"),
            update_time_column: String::from("update_time"),
            timestamp_format: String::from(DATETIME_FORMAT),
            skip_refetch_on_sqlite: true,
        }
    }
}

impl UpsertOptions {
    /// Parses options from JSON. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or mistyped values.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
