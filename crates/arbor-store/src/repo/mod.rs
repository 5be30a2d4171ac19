//! Repository layer
//!
//! Repositories are stateless: each operation borrows a connection and a
//! cancellation token from the caller.

pub mod journal_repo;
pub mod node_repo;

pub use journal_repo::JournalRepo;
pub use node_repo::NodeRepo;
