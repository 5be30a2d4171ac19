//! Read access to the exception journal

use arbor_core::model::{JournalEntry, JournalFilter};
use arbor_core::rules::validate_paging;
use arbor_core::{log_op_end, log_op_error, log_op_start};
use arbor_core_types::CancellationToken;
use arbor_store::errors::Result;
use arbor_store::{Database, JournalRepo};

#[derive(Debug, Clone)]
pub struct JournalService {
    db: Database,
}

impl JournalService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Filtered page of journal entries, newest first, with the filtered total
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero or out-of-range page, otherwise any
    /// storage error.
    pub fn get_range(
        &self,
        cancel: &CancellationToken,
        skip: u64,
        take: u64,
        filter: &JournalFilter,
    ) -> Result<(Vec<JournalEntry>, u64)> {
        log_op_start!("journal_range", skip = skip, take = take);
        let start = std::time::Instant::now();

        let result = validate_paging(skip, take)
            .map_err(Into::into)
            .and_then(|()| self.db.conn())
            .and_then(|conn| JournalRepo::get_range(&conn, cancel, skip, take, filter));

        match &result {
            Ok((_, total)) => {
                log_op_end!(
                    "journal_range",
                    duration_ms = start.elapsed().as_millis() as u64,
                    total_count = *total
                );
            }
            Err(e) => log_op_error!(
                "journal_range",
                e,
                duration_ms = start.elapsed().as_millis() as u64
            ),
        }

        result
    }

    /// Single journal entry by row id
    ///
    /// # Errors
    ///
    /// Returns any storage error.
    pub fn get_by_id(
        &self,
        cancel: &CancellationToken,
        journal_id: i64,
    ) -> Result<Option<JournalEntry>> {
        let conn = self.db.conn()?;
        JournalRepo::get_by_id(&conn, cancel, journal_id)
    }
}
