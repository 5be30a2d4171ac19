//! Response wire shapes
//!
//! Field names are camelCase on the wire.

use arbor_core::model::JournalEntry;
use arbor_core_types::EventId;
use serde::{Deserialize, Serialize};

/// One row of a journal page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalInfo {
    pub id: i64,
    pub event_id: EventId,
    pub created_at: String,
}

impl From<&JournalEntry> for JournalInfo {
    fn from(entry: &JournalEntry) -> Self {
        Self {
            id: entry.id,
            event_id: entry.event_id,
            created_at: entry.created_at_rfc3339(),
        }
    }
}

/// A page of the journal
///
/// `count` is the size of the filtered set, not of `items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalPage {
    pub skip: u64,
    pub count: u64,
    pub items: Vec<JournalInfo>,
}

/// A single journal entry with its rendered text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalDetail {
    pub id: i64,
    pub event_id: EventId,
    pub created_at: String,
    pub text: String,
}

impl From<&JournalEntry> for JournalDetail {
    fn from(entry: &JournalEntry) -> Self {
        Self {
            id: entry.id,
            event_id: entry.event_id,
            created_at: entry.created_at_rfc3339(),
            text: entry.render_text(),
        }
    }
}

/// Whether a failure's message was safe to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureType {
    Secure,
    Exception,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorData {
    pub message: String,
}

/// Body returned for every captured failure
///
/// `id` is the event id as a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub failure_type: FailureType,
    pub id: String,
    pub data: ErrorData,
}
