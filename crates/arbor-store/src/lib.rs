//! Arbor Store - SQLite persistence for the tree forest and the exception journal
//!
//! Provides:
//! - Connection pooling and per-connection configuration
//! - SQLite schema with a migrations framework
//! - `NodeRepo`: the self-referencing node table
//! - `JournalRepo`: the append-only exception journal

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use db::{Database, StoreConfig};
pub use errors::Result;
pub use repo::{JournalRepo, NodeRepo};
