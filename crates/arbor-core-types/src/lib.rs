//! Core types shared across Arbor facilities
//!
//! This crate provides foundational types used by the error, logging and
//! journaling facilities:
//!
//! - **Correlation types**: RequestId, EventId
//! - **Cancellation**: CancellationToken checked before every storage round trip
//! - **Schema constants**: Canonical field keys and event names

pub mod cancel;
pub mod correlation;
pub mod schema;

pub use cancel::CancellationToken;
pub use correlation::{EventId, RequestId};
