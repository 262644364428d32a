//! # Database Access
//!
//! SQLite persistence shared by the form schema and settings stores.
//!
//! A [`Database`] is only a handle to a file: every operation opens its
//! own connection, so several server processes may share one database and
//! all write serialization happens in SQLite's locking, never in process
//! memory.

pub mod errors;
pub mod migrations;

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;

pub use errors::{DbError, DbResult};
pub use migrations::{current_version, latest_version, migrate, Migration, MIGRATIONS};

/// How long a writer waits on a competing writer's lock
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the application database file
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Open the database at `path`, creating it if needed, and apply pending migrations.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let db = Self {
            path: path.as_ref().to_path_buf(),
        };
        let mut conn = db.connect()?;
        migrate(&mut conn)?;
        Ok(db)
    }

    /// Open a fresh connection with the service's pragmas applied
    pub fn connect(&self) -> DbResult<Connection> {
        let conn = Connection::open(&self.path).map_err(|e| DbError::Open {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        conn.execute_batch(
            "
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        Ok(conn)
    }

    /// Applied schema version
    pub fn schema_version(&self) -> DbResult<u32> {
        let conn = self.connect()?;
        current_version(&conn)
    }
}
