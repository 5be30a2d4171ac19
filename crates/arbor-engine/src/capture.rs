//! Failure capture
//!
//! `FailureCapture::run` wraps one request. A failed result or a panic is
//! appended to the exception journal and turned into an `ErrorBody`; the
//! failure is never re-raised. Journal write failures are logged and
//! swallowed, in which case a pre-generated event id is reported instead.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use arbor_core::errors::{ErrorKind, ExError};
use arbor_core::model::NewJournalEntry;
use arbor_core_types::schema::EVENT_CAPTURED;
use arbor_core_types::{CancellationToken, EventId};
use arbor_store::errors::Result;
use arbor_store::{Database, JournalRepo};

use crate::dispatch::RequestMeta;
use crate::dto::{ErrorBody, ErrorData, FailureType};

/// Status code reported for every captured failure
pub const FAILURE_STATUS: u16 = 500;

/// A failure that has been journaled and classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFailure {
    pub event_id: EventId,
    pub kind: ErrorKind,
    pub body: ErrorBody,
}

impl CapturedFailure {
    pub fn status(&self) -> u16 {
        FAILURE_STATUS
    }
}

thread_local! {
    /// Location and backtrace of the last panic on this thread
    static PANIC_TRACE: RefCell<Option<String>> = RefCell::new(None);
}

static PANIC_HOOK: Once = Once::new();

/// Chain a hook that records the panicking thread's backtrace before the
/// stack unwinds
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let trace = format!("{}\n{}", info, Backtrace::force_capture());
            let _ = PANIC_TRACE.try_with(|slot| slot.replace(Some(trace)));
            previous(info);
        }));
    });
}

fn take_panic_trace() -> Option<String> {
    PANIC_TRACE.with(|slot| slot.borrow_mut().take())
}

/// Normalized view of an error or panic
struct Failure {
    kind: ErrorKind,
    message: String,
    trace: String,
}

impl Failure {
    fn from_error(err: &ExError) -> Self {
        let message = if err.message().is_empty() {
            err.to_string()
        } else {
            err.message().to_string()
        };
        Self {
            kind: err.kind(),
            message,
            trace: err.trace(),
        }
    }

    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "panic with a non-string payload".to_string()
        };
        Self {
            kind: ErrorKind::Panic,
            message,
            trace: take_panic_trace()
                .unwrap_or_else(|| "panic location unavailable".to_string()),
        }
    }
}

/// Journals failures of wrapped requests
#[derive(Debug, Clone)]
pub struct FailureCapture {
    db: Database,
}

impl FailureCapture {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Run `op`, capturing any error or panic it produces
    ///
    /// # Errors
    ///
    /// Returns the captured failure, already journaled, when `op` fails or
    /// panics.
    pub fn run<T, F>(&self, meta: &RequestMeta, op: F) -> std::result::Result<T, CapturedFailure>
    where
        F: FnOnce() -> Result<T>,
    {
        install_panic_hook();
        // Stale trace from a panic caught elsewhere on this thread
        take_panic_trace();

        let failure = match panic::catch_unwind(AssertUnwindSafe(op)) {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) => Failure::from_error(&err),
            Err(payload) => Failure::from_panic(payload),
        };

        Err(self.capture(meta, failure))
    }

    fn capture(&self, meta: &RequestMeta, failure: Failure) -> CapturedFailure {
        let fallback = EventId::next();

        let entry = NewJournalEntry {
            exception_type: failure.kind.name().to_string(),
            message: failure.message.clone(),
            stack_trace: failure.trace,
            query_parameters: meta.query_json(),
            body_parameters: meta.body_snapshot(),
            endpoint: meta.endpoint(),
        };

        let event_id = match self.append(&entry) {
            Ok(event_id) => event_id,
            Err(e) => {
                tracing::error!(
                    component = module_path!(),
                    op = "journal_append",
                    event_id = fallback.get(),
                    err_code = e.code(),
                    error = %e,
                    "failed to write exception journal"
                );
                fallback
            }
        };

        tracing::warn!(
            component = module_path!(),
            op = "capture",
            event = EVENT_CAPTURED,
            event_id = event_id.get(),
            err_kind = failure.kind.name(),
            err_code = failure.kind.code(),
            endpoint = %entry.endpoint,
        );

        let body = if failure.kind.is_secure() {
            ErrorBody {
                failure_type: FailureType::Secure,
                id: event_id.to_string(),
                data: ErrorData {
                    message: failure.message,
                },
            }
        } else {
            ErrorBody {
                failure_type: FailureType::Exception,
                id: event_id.to_string(),
                data: ErrorData {
                    message: format!("Internal server error ID = {}", event_id),
                },
            }
        };

        CapturedFailure {
            event_id,
            kind: failure.kind,
            body,
        }
    }

    fn append(&self, entry: &NewJournalEntry) -> Result<EventId> {
        let conn = self.db.conn()?;
        // The request's own token may already have fired
        JournalRepo::append(&conn, &CancellationToken::new(), entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::errors::ArborError;
    use arbor_core::model::JournalFilter;

    fn meta() -> RequestMeta {
        RequestMeta::new("POST", "/api.user.tree.node.delete").with_query("nodeId", "9")
    }

    fn journal_count(db: &Database) -> u64 {
        let conn = db.conn().unwrap();
        JournalRepo::get_range(
            &conn,
            &CancellationToken::new(),
            0,
            1,
            &JournalFilter::default(),
        )
        .unwrap()
        .1
    }

    #[test]
    fn test_success_passes_through_without_journal() {
        let db = Database::open_in_memory().unwrap();
        let capture = FailureCapture::new(db.clone());

        let value = capture.run(&meta(), || Ok(5)).unwrap();
        assert_eq!(value, 5);
        assert_eq!(journal_count(&db), 0);
    }

    #[test]
    fn test_secure_failure_exposes_message() {
        let db = Database::open_in_memory().unwrap();
        let capture = FailureCapture::new(db.clone());

        let failure = capture
            .run::<(), _>(&meta(), || {
                Err(ArborError::NodeNotFound { node_id: 9 }.into())
            })
            .unwrap_err();

        assert_eq!(failure.status(), 500);
        assert_eq!(failure.body.failure_type, FailureType::Secure);
        assert_eq!(failure.body.data.message, "Node with ID 9 not found.");
        assert_eq!(failure.body.id, failure.event_id.to_string());
        assert_eq!(journal_count(&db), 1);
    }

    #[test]
    fn test_internal_failure_hides_message() {
        let db = Database::open_in_memory().unwrap();
        let capture = FailureCapture::new(db);

        let failure = capture
            .run::<(), _>(&meta(), || {
                Err(ExError::new(ErrorKind::Persistence).with_message("disk I/O error"))
            })
            .unwrap_err();

        assert_eq!(failure.body.failure_type, FailureType::Exception);
        assert_eq!(
            failure.body.data.message,
            format!("Internal server error ID = {}", failure.event_id)
        );
    }

    #[test]
    fn test_panic_is_captured() {
        let db = Database::open_in_memory().unwrap();
        let capture = FailureCapture::new(db.clone());

        let failure = capture
            .run::<(), _>(&meta(), || panic!("handler exploded"))
            .unwrap_err();

        assert_eq!(failure.kind, ErrorKind::Panic);
        assert_eq!(failure.body.failure_type, FailureType::Exception);

        let conn = db.conn().unwrap();
        let entry = JournalRepo::get_by_id(&conn, &CancellationToken::new(), 1)
            .unwrap()
            .unwrap();
        assert_eq!(entry.exception_type, "Panic");
        assert_eq!(entry.message, "handler exploded");
        // Recorded where the panic was raised, not where it was caught
        assert!(entry.stack_trace.starts_with("panicked at"));
        assert!(entry.stack_trace.contains("capture.rs"));
        assert!(entry.stack_trace.contains("handler exploded"));
        assert_eq!(entry.endpoint, "POST /api.user.tree.node.delete");
        assert_eq!(entry.query_parameters, "{\"nodeId\":\"9\"}");
        assert_eq!(entry.body_parameters, "{}");
    }
}
