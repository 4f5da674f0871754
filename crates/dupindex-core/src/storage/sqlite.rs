use crate::error::Error;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

const SCHEMA_VERSION: i64 = 1;

/// SQLite-backed file index.
///
/// The connection sits behind a mutex so one `Database` can be shared by all
/// persistence workers; each batch holds the lock for exactly one
/// transaction.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path.as_ref())?;
        debug!("Opened index database at {}", path.as_ref().display());
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, Error> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, Error> {
        configure_pragmas(&conn)?;
        migrate_schema(&conn)?;
        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    pub fn connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.conn.lock().map_err(|_| Error::LockPoisoned)
    }

    pub fn truncate_all(&self) -> Result<(), Error> {
        self.connection()?.execute_batch("DELETE FROM file_record;")?;
        debug!("All tables truncated");
        Ok(())
    }
}

fn configure_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA cache_size = -64000;
         PRAGMA busy_timeout = 5000;",
    )?;
    debug!("SQLite pragmas configured (WAL mode, 64MB cache)");
    Ok(())
}

fn migrate_schema(conn: &Connection) -> rusqlite::Result<()> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version > SCHEMA_VERSION {
        debug!(
            "Schema version {} is newer than {}, leaving it untouched",
            version, SCHEMA_VERSION
        );
        return Ok(());
    }

    conn.execute_batch(include_str!("schema.sql"))?;
    debug!("SQLite schema initialized (version {})", SCHEMA_VERSION);
    Ok(())
}
