pub mod journal;
pub mod tree_node;

pub use journal::{JournalEntry, JournalFilter, NewJournalEntry};
pub use tree_node::{NodeWithRelations, TreeNode, TreeView, MAX_TREE_DEPTH, VIRTUAL_ROOT_ID};
