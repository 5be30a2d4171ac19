//! Exception journal repository
//!
//! Append-only. `created_at` is stored as unix milliseconds (UTC) so range
//! filters and ordering are plain integer comparisons.

use crate::errors::{ensure_active, from_rusqlite, Result};
use arbor_core::errors::{ArborError, ErrorKind, ExError};
use arbor_core::model::{JournalEntry, JournalFilter, NewJournalEntry};
use arbor_core_types::{CancellationToken, EventId};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

const JOURNAL_COLUMNS: &str = "id, event_id, created_at, exception_type, message, stack_trace, \
                               query_parameters, body_parameters, endpoint";

const FILTER_CLAUSE: &str = "(?1 IS NULL OR created_at >= ?1)
      AND (?2 IS NULL OR created_at <= ?2)
      AND (?3 IS NULL
           OR instr(message, ?3) > 0
           OR instr(exception_type, ?3) > 0
           OR instr(stack_trace, ?3) > 0)";

/// SQLite repository for the exception journal
pub struct JournalRepo;

impl JournalRepo {
    /// Persist a captured failure, stamping its event id and creation time
    ///
    /// # Errors
    ///
    /// Every failure is reported as `Unavailable`, with the underlying
    /// storage error kept as its source.
    pub fn append(
        conn: &Connection,
        cancel: &CancellationToken,
        entry: &NewJournalEntry,
    ) -> Result<EventId> {
        ensure_active(cancel, "journal_append")?;

        let event_id = EventId::next();
        let created_at = Utc::now().timestamp_millis();

        conn.execute(
            "INSERT INTO exception_journal (
                event_id, created_at, exception_type, message, stack_trace,
                query_parameters, body_parameters, endpoint
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                event_id.get(),
                created_at,
                entry.exception_type,
                entry.message,
                entry.stack_trace,
                entry.query_parameters,
                entry.body_parameters,
                entry.endpoint,
            ],
        )
        .map_err(|e| unavailable(from_rusqlite(e)))?;

        Ok(event_id)
    }

    /// Fetch one journal row by its row id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the token is cancelled.
    pub fn get_by_id(
        conn: &Connection,
        cancel: &CancellationToken,
        journal_id: i64,
    ) -> Result<Option<JournalEntry>> {
        ensure_active(cancel, "journal_get")?;

        conn.query_row(
            &format!(
                "SELECT {} FROM exception_journal WHERE id = ?",
                JOURNAL_COLUMNS
            ),
            [journal_id],
            map_entry,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Page through the filtered journal, newest first
    ///
    /// Returns the page and the size of the filtered set before paging.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `skip`/`take` do not fit SQLite integers,
    /// otherwise any query failure.
    pub fn get_range(
        conn: &Connection,
        cancel: &CancellationToken,
        skip: u64,
        take: u64,
        filter: &JournalFilter,
    ) -> Result<(Vec<JournalEntry>, u64)> {
        let offset = to_sql_int(skip, "skip")?;
        let limit = to_sql_int(take, "take")?;

        let from = filter.from.map(ceil_millis);
        let to = filter.to.map(|t| t.timestamp_millis());
        let search = filter.search_term();

        ensure_active(cancel, "journal_count")?;

        let total: i64 = conn
            .query_row(
                &format!(
                    "SELECT COUNT(*) FROM exception_journal WHERE {}",
                    FILTER_CLAUSE
                ),
                params![from, to, search],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)?;

        ensure_active(cancel, "journal_range")?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM exception_journal
                 WHERE {}
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?4 OFFSET ?5",
                JOURNAL_COLUMNS, FILTER_CLAUSE
            ))
            .map_err(from_rusqlite)?;

        let items = stmt
            .query_map(params![from, to, search, limit, offset], map_entry)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        Ok((items, u64::try_from(total).unwrap_or_default()))
    }
}

fn map_entry(row: &Row<'_>) -> rusqlite::Result<JournalEntry> {
    let created_ms: i64 = row.get(2)?;
    Ok(JournalEntry {
        id: row.get(0)?,
        event_id: EventId::from_raw(row.get(1)?),
        created_at: millis_to_utc(created_ms),
        exception_type: row.get(3)?,
        message: row.get(4)?,
        stack_trace: row.get(5)?,
        query_parameters: row.get(6)?,
        body_parameters: row.get(7)?,
        endpoint: row.get(8)?,
    })
}

/// Smallest whole millisecond not earlier than `t`
///
/// Rows hold whole milliseconds, so an inclusive lower bound rounds up.
fn ceil_millis(t: DateTime<Utc>) -> i64 {
    let floor = t.timestamp_millis();
    if t.timestamp_subsec_nanos() % 1_000_000 == 0 {
        floor
    } else {
        floor.saturating_add(1)
    }
}

fn millis_to_utc(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or_default()
}

fn to_sql_int(value: u64, field: &str) -> Result<i64> {
    i64::try_from(value).map_err(|_| {
        ArborError::InvalidPaging {
            reason: format!("{} is out of range", field),
        }
        .into()
    })
}

fn unavailable(source: ExError) -> ExError {
    ExError::new(ErrorKind::Unavailable)
        .with_op("journal_append")
        .with_message("Exception journal could not be written")
        .with_source(source)
}
