//! # Schema Migrations
//!
//! Forward-only, versioned DDL. Each migration runs in its own
//! transaction together with the row that records it, so a crash
//! mid-migration leaves the previous version intact.

use chrono::Utc;
use rusqlite::{params, Connection, TransactionBehavior};

use super::errors::{DbError, DbResult};
use crate::observability::{log_event, Event};

/// One versioned schema change
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

/// All migrations in application order. Versions must be strictly increasing.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_form_schemas",
        sql: "
            CREATE TABLE form_schemas (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                schema      TEXT NOT NULL DEFAULT '{}',
                active      INTEGER NOT NULL DEFAULT 0 CHECK (active IN (0, 1)),
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );
        ",
    },
    Migration {
        version: 2,
        name: "create_settings",
        sql: "
            CREATE TABLE settings (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
        ",
    },
    Migration {
        version: 3,
        name: "single_active_form_schema",
        // At most one row may carry active = 1.
        sql: "
            CREATE UNIQUE INDEX form_schemas_single_active
                ON form_schemas(active) WHERE active = 1;
        ",
    },
    Migration {
        version: 4,
        name: "seed_applications_open",
        sql: "
            INSERT OR IGNORE INTO settings (key, value, updated_at)
                VALUES ('applications_open', 'false', datetime('now'));
        ",
    },
];

/// Highest version known to this binary
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

/// Currently applied version (0 on a fresh database)
pub fn current_version(conn: &Connection) -> DbResult<u32> {
    ensure_ledger(conn)?;
    let version: Option<u32> =
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| row.get(0))?;
    Ok(version.unwrap_or(0))
}

/// Apply every pending migration. Returns the versions applied by this call.
pub fn migrate(conn: &mut Connection) -> DbResult<Vec<u32>> {
    let current = current_version(conn)?;
    let mut applied = Vec::new();

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        apply(conn, migration).map_err(|e| DbError::Migration {
            version: migration.version,
            name: migration.name,
            message: e.to_string(),
        })?;

        log_event(
            Event::MigrationApplied,
            &[
                ("name", migration.name),
                ("version", &migration.version.to_string()),
            ],
        );
        applied.push(migration.version);
    }

    Ok(applied)
}

fn ensure_ledger(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            name       TEXT NOT NULL,
            applied_at TEXT NOT NULL
        );",
    )?;
    Ok(())
}

fn apply(conn: &mut Connection, migration: &Migration) -> rusqlite::Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    // Another process may have applied it while we waited for the write lock.
    let already: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM schema_migrations WHERE version = ?1)",
        params![migration.version],
        |row| row.get(0),
    )?;
    if already {
        return tx.commit();
    }

    tx.execute_batch(migration.sql)?;
    tx.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
        params![migration.version, migration.name, Utc::now()],
    )?;
    tx.commit()
}
