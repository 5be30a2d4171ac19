//! Database connection management
//!
//! A `Database` owns an r2d2 pool of SQLite connections. Every pooled
//! connection is configured on checkout creation (foreign keys, WAL, busy
//! timeout) and the schema is migrated once when the pool is opened.

use crate::errors::{from_pool, io_error, Result};
use crate::migrations::apply_migrations;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::PathBuf;
use std::time::Duration;

/// Pool of configured SQLite connections
pub type SqlitePool = r2d2::Pool<SqliteConnectionManager>;

/// A connection checked out of the pool
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Default database location, relative to the working directory
pub const DEFAULT_DB_PATH: &str = ".arbor/store.db";

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite database file
    pub db_path: PathBuf,
    /// Maximum number of pooled connections
    pub pool_size: u32,
    /// How long a statement waits on a locked database, and how long a
    /// caller waits for a free pooled connection
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            pool_size: 8,
            busy_timeout_ms: 5_000,
        }
    }
}

impl StoreConfig {
    /// Default configuration for a database at `path`
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: path.into(),
            ..Self::default()
        }
    }
}

/// Handle to the pooled database
///
/// Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.pool.state();
        f.debug_struct("Database")
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .finish()
    }
}

impl Database {
    /// Open (creating if needed) the database described by `config`
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the directory or the pool cannot be created,
    /// and `Persistence` if migrations fail.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| io_error("create_db_dir", e))?;
            }
        }

        let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
        let manager = SqliteConnectionManager::file(&config.db_path)
            .with_init(move |conn| configure(conn, busy_timeout));

        let pool = r2d2::Pool::builder()
            .max_size(config.pool_size.max(1))
            .connection_timeout(busy_timeout)
            .build(manager)
            .map_err(from_pool)?;

        Self::from_pool(pool)
    }

    /// Open a private in-memory database (for testing)
    ///
    /// The pool holds a single connection that is never recycled, since every
    /// SQLite in-memory connection is its own database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or migrations fail.
    pub fn open_in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory()
            .with_init(|conn| configure(conn, Duration::from_millis(5_000)));

        let pool = r2d2::Pool::builder()
            .max_size(1)
            .min_idle(Some(1))
            .idle_timeout(None)
            .max_lifetime(None)
            .build(manager)
            .map_err(from_pool)?;

        Self::from_pool(pool)
    }

    fn from_pool(pool: SqlitePool) -> Result<Self> {
        let mut conn = pool.get().map_err(from_pool)?;
        apply_migrations(&mut conn)?;
        drop(conn);
        Ok(Self { pool })
    }

    /// Check a connection out of the pool
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if no connection frees up within the timeout.
    pub fn conn(&self) -> Result<PooledConnection> {
        self.pool.get().map_err(from_pool)
    }
}

/// Configure a connection with the settings every operation relies on
///
/// Foreign keys must be on for the parent reference and its cascade.
pub fn configure(conn: &mut Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout)?;
    conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;")?;
    Ok(())
}
