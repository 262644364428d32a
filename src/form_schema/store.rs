//! # Active Version Store
//!
//! Form schema versions with exactly one active version.
//!
//! ## Invariants
//! - At most one row has `active = 1`. Enforced twice: by the
//!   `form_schemas_single_active` partial unique index, and by `activate`
//!   clearing and setting the flag inside one `BEGIN IMMEDIATE` transaction.
//! - Content updates never touch the active flag.
//! - Ids come from AUTOINCREMENT and are never reused after deletion.

use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use super::errors::{FormSchemaError, FormSchemaResult};
use super::types::{FormSchemaPatch, FormSchemaVersion, NewFormSchema};
use crate::db::Database;
use crate::observability::{log_event, Event};

const SELECT_COLUMNS: &str =
    "SELECT id, name, description, schema, active, created_at, updated_at FROM form_schemas";

/// Store of form schema versions
#[derive(Debug, Clone)]
pub struct ActiveVersionStore {
    db: Database,
}

impl ActiveVersionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// All versions, oldest first
    pub fn list(&self) -> FormSchemaResult<Vec<FormSchemaVersion>> {
        let conn = self.db.connect()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))?;
        let versions = stmt
            .query_map([], map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(versions)
    }

    pub fn get(&self, id: i64) -> FormSchemaResult<FormSchemaVersion> {
        let conn = self.db.connect()?;
        find(&conn, id)?.ok_or(FormSchemaError::NotFound(id))
    }

    /// The single active version
    pub fn get_active(&self) -> FormSchemaResult<FormSchemaVersion> {
        let conn = self.db.connect()?;
        conn.query_row(
            &format!("{} WHERE active = 1", SELECT_COLUMNS),
            [],
            map_row,
        )
        .optional()?
        .ok_or(FormSchemaError::NoActiveVersion)
    }

    /// Insert a new, inactive version
    pub fn create(&self, data: NewFormSchema) -> FormSchemaResult<FormSchemaVersion> {
        data.validate()?;

        let conn = self.db.connect()?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO form_schemas (name, description, schema, active, created_at, updated_at)
             VALUES (?1, ?2, ?3, 0, ?4, ?4)",
            params![data.name, data.description, data.schema.to_string(), now],
        )?;
        let id = conn.last_insert_rowid();

        let version = find(&conn, id)?.ok_or(FormSchemaError::NotFound(id))?;
        log_event(
            Event::FormSchemaCreated,
            &[("id", &id.to_string()), ("name", &version.name)],
        );
        Ok(version)
    }

    /// Change content fields of an existing version
    pub fn update(&self, id: i64, patch: FormSchemaPatch) -> FormSchemaResult<FormSchemaVersion> {
        patch.validate()?;

        let mut conn = self.db.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut version = find(&tx, id)?.ok_or(FormSchemaError::NotFound(id))?;
        patch.apply_to(&mut version);
        version.updated_at = Utc::now();

        tx.execute(
            "UPDATE form_schemas SET name = ?1, description = ?2, schema = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                version.name,
                version.description,
                version.schema.to_string(),
                version.updated_at,
                id
            ],
        )?;
        let version = find(&tx, id)?.ok_or(FormSchemaError::NotFound(id))?;
        tx.commit()?;

        log_event(Event::FormSchemaUpdated, &[("id", &id.to_string())]);
        Ok(version)
    }

    /// Delete a version. Removing the active version leaves none active.
    pub fn remove(&self, id: i64) -> FormSchemaResult<()> {
        let mut conn = self.db.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let was_active: bool = tx
            .query_row(
                "SELECT active FROM form_schemas WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(FormSchemaError::NotFound(id))?;

        tx.execute("DELETE FROM form_schemas WHERE id = ?1", params![id])?;
        tx.commit()?;

        log_event(
            Event::FormSchemaRemoved,
            &[("id", &id.to_string()), ("was_active", bool_str(was_active))],
        );
        Ok(())
    }

    /// Make `id` the only active version.
    ///
    /// Concurrent calls serialize on SQLite's write lock; the last to
    /// commit wins and no interleaving can leave two rows active.
    pub fn activate(&self, id: i64) -> FormSchemaResult<FormSchemaVersion> {
        let mut conn = self.db.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Dropping `tx` on the early return rolls back.
        if find(&tx, id)?.is_none() {
            return Err(FormSchemaError::NotFound(id));
        }

        let now = Utc::now();
        // Explicit predicate: every active row other than the target.
        let cleared = tx.execute(
            "UPDATE form_schemas SET active = 0, updated_at = ?1 WHERE active = 1 AND id <> ?2",
            params![now, id],
        )?;
        tx.execute(
            "UPDATE form_schemas SET active = 1, updated_at = ?1 WHERE id = ?2 AND active = 0",
            params![now, id],
        )?;

        let version = find(&tx, id)?.ok_or(FormSchemaError::NotFound(id))?;
        tx.commit()?;

        log_event(
            Event::FormSchemaActivated,
            &[("cleared", &cleared.to_string()), ("id", &id.to_string())],
        );
        Ok(version)
    }

    /// Number of versions currently flagged active (0 or 1)
    pub fn active_count(&self) -> FormSchemaResult<u32> {
        let conn = self.db.connect()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM form_schemas WHERE active = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn find(conn: &Connection, id: i64) -> FormSchemaResult<Option<FormSchemaVersion>> {
    let version = conn
        .query_row(
            &format!("{} WHERE id = ?1", SELECT_COLUMNS),
            params![id],
            map_row,
        )
        .optional()?;
    Ok(version)
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<FormSchemaVersion> {
    let schema_text: String = row.get(3)?;
    let schema = serde_json::from_str(&schema_text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    Ok(FormSchemaVersion {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        schema,
        active: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
