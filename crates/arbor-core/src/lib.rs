//! Arbor Core - domain kernel for the tree forest and the exception journal
//!
//! This crate provides the storage-independent parts of Arbor:
//! - Tree node and journal entry models
//! - Tree assembly from flat node rows into a hierarchy (with virtual roots)
//! - Input validation for tree and node names
//! - The canonical error facility (`ArborError` / `ExError`)
//! - The structured logging facility

pub mod assembly;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod rules;

// Re-export commonly used types
pub use assembly::{assemble_tree, virtual_root};
pub use errors::{ArborError, ErrorKind, ExError, Result};
pub use model::{
    JournalEntry, JournalFilter, NewJournalEntry, NodeWithRelations, TreeNode, TreeView,
    MAX_TREE_DEPTH, VIRTUAL_ROOT_ID,
};
