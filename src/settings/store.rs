//! # Settings Store
//!
//! String key/value feature flags. Key uniqueness is the table's primary key.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::errors::{SettingsError, SettingsResult};
use crate::db::Database;
use crate::observability::{log_event, Event};

/// Gate for applicant-facing actions
pub const APPLICATIONS_OPEN: &str = "applications_open";

/// Longest accepted value
pub const MAX_VALUE_LEN: usize = 4096;

/// One stored setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingEntry {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Key/value settings backed by the `settings` table
#[derive(Debug, Clone)]
pub struct SettingsStore {
    db: Database,
}

impl SettingsStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// All settings ordered by key
    pub fn list(&self) -> SettingsResult<Vec<SettingEntry>> {
        let conn = self.db.connect()?;
        let mut stmt =
            conn.prepare("SELECT key, value, updated_at FROM settings ORDER BY key ASC")?;
        let entries = stmt
            .query_map([], map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn get(&self, key: &str) -> SettingsResult<SettingEntry> {
        validate_key(key)?;
        let conn = self.db.connect()?;
        conn.query_row(
            "SELECT key, value, updated_at FROM settings WHERE key = ?1",
            params![key],
            map_row,
        )
        .optional()?
        .ok_or_else(|| SettingsError::NotFound(key.to_string()))
    }

    /// Insert or overwrite a value
    pub fn set(&self, key: &str, value: &str) -> SettingsResult<SettingEntry> {
        validate_key(key)?;
        if value.len() > MAX_VALUE_LEN {
            return Err(SettingsError::ValueTooLong(value.len(), MAX_VALUE_LEN));
        }

        let conn = self.db.connect()?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;

        log_event(Event::SettingUpdated, &[("key", key), ("value", value)]);
        Ok(SettingEntry {
            key: key.to_string(),
            value: value.to_string(),
            updated_at: now,
        })
    }

    /// Read a boolean flag. Missing keys are off.
    pub fn is_enabled(&self, key: &str) -> SettingsResult<bool> {
        match self.get(key) {
            Ok(entry) => Ok(parse_flag(&entry.value)),
            Err(SettingsError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Truthy values: `true`, `1`, `yes`, `on` (case-insensitive)
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

fn validate_key(key: &str) -> SettingsResult<()> {
    static KEY_PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = KEY_PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9][a-z0-9_.-]{0,127}$").expect("setting key pattern is valid")
    });

    if pattern.is_match(key) {
        Ok(())
    } else {
        Err(SettingsError::InvalidKey(key.to_string()))
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<SettingEntry> {
    Ok(SettingEntry {
        key: row.get(0)?,
        value: row.get(1)?,
        updated_at: row.get(2)?,
    })
}
