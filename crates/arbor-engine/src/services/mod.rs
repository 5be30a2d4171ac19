//! Service layer
//!
//! Services are the single authorized entry point to the repositories. Each
//! checks a pooled connection out per call.

pub mod journal_service;
pub mod tree_service;

pub use journal_service::JournalService;
pub use tree_service::TreeService;
