pub mod validation;

pub use validation::{validate_node_name, validate_paging, validate_tree_name, MAX_NAME_LEN};
