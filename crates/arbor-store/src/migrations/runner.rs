//! Applies the migration catalog to a connection

use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::{checksum_mismatch, from_rusqlite, migration_error, Result};
use crate::migrations::embedded::{Migration, MIGRATIONS};

const VERSION_TABLE: &str = "CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY,
    migration_id TEXT NOT NULL UNIQUE,
    applied_at INTEGER NOT NULL,
    checksum TEXT
)";

/// Bring the schema up to date
///
/// Already-applied migrations are skipped after their recorded checksum is
/// compared with the compiled-in SQL. Each pending migration runs in its own
/// transaction together with its `schema_version` row.
///
/// # Errors
///
/// Returns `Persistence` if a migration fails or an applied migration's
/// checksum no longer matches.
pub fn apply_migrations(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(VERSION_TABLE).map_err(from_rusqlite)?;

    let mut applied = 0usize;
    for migration in MIGRATIONS {
        let checksum = migration.checksum();
        match recorded_checksum(conn, migration.id)? {
            Some(Some(recorded)) if recorded != checksum => {
                return Err(checksum_mismatch(migration.id, &recorded, &checksum));
            }
            Some(_) => continue,
            None => {
                apply(conn, migration, &checksum)?;
                applied += 1;
            }
        }
    }

    if applied > 0 {
        tracing::debug!(applied, total = MIGRATIONS.len(), "schema migrated");
    }
    Ok(())
}

/// `None` if never applied; `Some(None)` if applied without a checksum
fn recorded_checksum(conn: &Connection, migration_id: &str) -> Result<Option<Option<String>>> {
    conn.query_row(
        "SELECT checksum FROM schema_version WHERE migration_id = ?1",
        [migration_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(from_rusqlite)
}

fn apply(conn: &mut Connection, migration: &Migration, checksum: &str) -> Result<()> {
    let tx = conn.transaction().map_err(from_rusqlite)?;
    tx.execute_batch(migration.sql)
        .map_err(|e| migration_error(migration.id, &e.to_string()))?;
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?1, ?2, ?3)",
        params![migration.id, chrono::Utc::now().timestamp(), checksum],
    )
    .map_err(from_rusqlite)?;
    tx.commit().map_err(from_rusqlite)
}
