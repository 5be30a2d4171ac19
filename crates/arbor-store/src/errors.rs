//! Error handling for arbor-store
//!
//! Wraps arbor-core ExError with store-specific helpers

use arbor_core::errors::{ArborError, ErrorKind, ExError};
use arbor_core_types::CancellationToken;
use rusqlite::ErrorCode;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a database error from rusqlite::Error
///
/// Busy, locked and unopenable databases are reported as `Unavailable`;
/// everything else is a `Persistence` failure.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if matches!(
                e.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::CannotOpen
            ) =>
        {
            ErrorKind::Unavailable
        }
        _ => ErrorKind::Persistence,
    };
    ExError::new(kind).with_op("sqlite").with_message(err.to_string())
}

/// Create a storage-unavailable error from a pool checkout failure
pub fn from_pool(err: r2d2::Error) -> ExError {
    ExError::from(ArborError::StorageUnavailable {
        message: err.to_string(),
    })
    .with_op("pool_checkout")
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ErrorKind::Unavailable)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Whether the error is a UNIQUE constraint violation
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Whether the error is a FOREIGN KEY constraint violation
pub fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

/// Fail with `Cancelled` if the token has fired
pub fn ensure_active(cancel: &CancellationToken, op: &str) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(ArborError::Cancelled { op: op.to_string() }.into());
    }
    Ok(())
}
