//! Logging for Arbor services
//!
//! [`init`] installs the process-wide subscriber for a [`Profile`]. Service
//! code logs operation boundaries through `log_op_start!`, `log_op_end!` and
//! `log_op_error!`, which share the event names in
//! `arbor_core_types::schema`. Tests swap the subscriber for
//! [`init_test_capture`] and query what was logged.
//!
//! ```rust
//! use arbor_core::logging_facility::{init, Profile};
//!
//! init(Profile::Test);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
