//! Arbor Engine - Orchestration layer
//!
//! Coordinates the domain rules in `arbor-core` with the repositories in
//! `arbor-store`, and exposes the request surface:
//! - `services`: tree and journal services
//! - `capture`: failure capture into the exception journal
//! - `dispatch`: typed requests run through failure capture
//! - `dto`: wire shapes for responses

pub mod capture;
pub mod dispatch;
pub mod dto;
pub mod services;

pub use capture::{CapturedFailure, FailureCapture};
pub use dispatch::{ApiRequest, ApiResponse, Dispatcher, RequestMeta};
pub use services::{JournalService, TreeService};
