use arbor_core_types::EventId;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A captured failure about to be appended to the journal
///
/// The store assigns the row id, the event id and the creation timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJournalEntry {
    pub exception_type: String,
    pub message: String,
    pub stack_trace: String,
    /// Query parameters serialized as a JSON object
    pub query_parameters: String,
    /// Raw request body, `{}` when none was sent
    pub body_parameters: String,
    /// `METHOD path`
    pub endpoint: String,
}

/// A persisted journal row
///
/// Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: i64,
    pub event_id: EventId,
    pub created_at: DateTime<Utc>,
    pub exception_type: String,
    pub message: String,
    pub stack_trace: String,
    pub query_parameters: String,
    pub body_parameters: String,
    pub endpoint: String,
}

impl JournalEntry {
    /// Human-readable rendering used by the single-entry query
    pub fn render_text(&self) -> String {
        format!(
            "Type: {}\nMessage: {}\nEndpoint: {}\nQuery: {}\nBody: {}\nStack Trace:\n{}",
            self.exception_type,
            self.message,
            self.endpoint,
            self.query_parameters,
            self.body_parameters,
            self.stack_trace
        )
    }

    /// Creation time as RFC 3339 with a `Z` suffix
    pub fn created_at_rfc3339(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Filter for journal range queries
///
/// `from`/`to` bound `created_at` inclusively. `search` is a case-sensitive
/// substring matched against message, exception type or stack trace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub search: Option<String>,
}

impl JournalFilter {
    /// Search term, treating an empty string as absent
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }
}
