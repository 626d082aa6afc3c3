pub mod migrations;
pub mod models;
pub mod queries;

use std::time::Duration;

use rusqlite::{Connection, ErrorCode, ffi};
use thiserror::Error;
use tracing::{debug, info};

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A UNIQUE or PRIMARY KEY constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("{0}")]
    Sqlite(rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, ref msg) = err {
            let unique = code.code == ErrorCode::ConstraintViolation
                && matches!(
                    code.extended_code,
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                );
            if unique {
                return Self::UniqueViolation(msg.clone().unwrap_or_else(|| code.to_string()));
            }
        }
        Self::Sqlite(err)
    }
}

impl StoreError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }
}

/// Connection settings for the relational store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// SQLite path or `file:` URI.
    pub database_url: String,
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }
}

/// Entry point to the store. Holds configuration only: every invocation opens
/// its own [`Session`], and the connection closes when the session drops.
#[derive(Debug, Clone)]
pub struct Store {
    config: StoreConfig,
}

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

impl Store {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Bring the schema up to date. Call once at startup.
    pub fn migrate(&self) -> Result<()> {
        let mut conn = self.open()?;

        // WAL so that concurrent invocations can read while one writes
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!("journal_mode={}", mode);
        migrations::run(&mut conn)?;

        info!("Store ready at {}", self.config.database_url);
        Ok(())
    }

    pub fn session(&self) -> Result<Session> {
        let conn = self.open()?;
        debug!("Store session opened");
        Ok(Session { conn })
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.config.database_url)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }
}

/// One invocation's connection. Queries live in [`queries`].
pub struct Session {
    conn: Connection,
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!("Store session closed");
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    /// Migrated store in a throw-away directory. Keep the `TempDir` alive.
    pub fn temp_store() -> (TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        let store = Store::new(StoreConfig::new(path.to_string_lossy()));
        store.migrate().unwrap();
        (dir, store)
    }
}
