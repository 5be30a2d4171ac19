//! Names shared by every structured log event
//!
//! Boundary macros and the failure capture emit these; tests match on them.

/// Module path of the emitting code
pub const FIELD_COMPONENT: &str = "component";
/// Operation name, e.g. `create_node`
pub const FIELD_OP: &str = "op";
/// One of the `EVENT_*` values below
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";
/// Journal event id of a captured failure
pub const FIELD_EVENT_ID: &str = "event_id";

/// An operation began
pub const EVENT_START: &str = "start";
/// An operation returned normally
pub const EVENT_END: &str = "end";
/// An operation returned an error
pub const EVENT_END_ERROR: &str = "end_error";
/// A request failure was written to the exception journal
pub const EVENT_CAPTURED: &str = "captured";
