//! Operation boundary macros
//!
//! Every service operation emits a `start` event, then exactly one of `end`
//! or `end_error`. All three carry `component`, `op` and `event`; the
//! terminal ones also carry `duration_ms`. Extra `key = value` fields are
//! passed straight through to `tracing`.

/// Shared body of the boundary macros
#[doc(hidden)]
#[macro_export]
macro_rules! __arbor_op_event {
    ($level:ident, $op:expr, $event:path $(, $($rest:tt)*)?) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $event,
            $($($rest)*)?
        )
    };
}

/// Log the start of an operation
///
/// ```
/// # use arbor_core::log_op_start;
/// log_op_start!("get_tree");
/// log_op_start!("create_node", tree_name = "T1", parent_id = Some(4));
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__arbor_op_event!(
            info,
            $op,
            arbor_core_types::schema::EVENT_START
            $(, $($field)*)?
        )
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use arbor_core::log_op_end;
/// log_op_end!("delete_node", duration_ms = 3, node_id = 12);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__arbor_op_event!(
            info,
            $op,
            arbor_core_types::schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)*)?
        )
    };
}

/// Log the failed end of an operation
///
/// `$err` is cloned into an `ExError`, so both `ArborError` and `ExError`
/// are accepted. The event records the error's kind, code and whether its
/// message may be shown to a caller.
///
/// ```
/// # use arbor_core::{log_op_error, errors::ArborError};
/// let err = ArborError::NodeNotFound { node_id: 1 };
/// log_op_error!("rename_node", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let failure: $crate::errors::ExError = ($err).clone().into();
        $crate::__arbor_op_event!(
            error,
            $op,
            arbor_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?failure.kind(),
            err_code = failure.code(),
            err_secure = failure.kind().is_secure()
            $(, $($field)*)?
        )
    }};
}
