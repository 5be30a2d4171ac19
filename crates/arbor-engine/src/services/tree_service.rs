//! Tree editing service
//!
//! Validates input, then delegates to `NodeRepo`. Not-found and conflict
//! failures from the store propagate unchanged.

use arbor_core::errors::{ArborError, ExError};
use arbor_core::model::{TreeNode, TreeView, MAX_TREE_DEPTH};
use arbor_core::rules::{validate_node_name, validate_tree_name};
use arbor_core::{assemble_tree, log_op_end, log_op_error, log_op_start, virtual_root};
use arbor_core_types::CancellationToken;
use arbor_store::errors::Result;
use arbor_store::{Database, NodeRepo};

/// Tree operations over the pooled database
#[derive(Debug, Clone)]
pub struct TreeService {
    db: Database,
}

impl TreeService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Fetch a tree by name, assembled into a hierarchy
    ///
    /// A tree with no rows yields an empty virtual root. Nothing is persisted.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a bad tree name, `Internal` when the tree is
    /// deeper than `MAX_TREE_DEPTH`, otherwise any storage error.
    pub fn get_or_create_tree(
        &self,
        cancel: &CancellationToken,
        tree_name: &str,
    ) -> Result<TreeView> {
        log_op_start!("get_tree", tree_name = tree_name);
        let start = std::time::Instant::now();

        let view = self.get_tree_impl(cancel, tree_name).map_err(|e| {
            log_op_error!(
                "get_tree",
                e,
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "get_tree",
            duration_ms = start.elapsed().as_millis() as u64,
            node_count = view.node_count()
        );

        Ok(view)
    }

    fn get_tree_impl(&self, cancel: &CancellationToken, tree_name: &str) -> Result<TreeView> {
        validate_tree_name(tree_name)?;

        let conn = self.db.conn()?;
        let rows = NodeRepo::load_tree(&conn, cancel, tree_name)?;

        if rows.is_empty() {
            return Ok(virtual_root(tree_name));
        }

        let view = assemble_tree(tree_name, rows);
        let depth = view.depth();
        if depth > MAX_TREE_DEPTH {
            return Err(ArborError::TreeTooDeep {
                tree_name: tree_name.to_string(),
                depth,
                limit: MAX_TREE_DEPTH,
            }
            .into());
        }
        Ok(view)
    }

    /// Create a node in `tree_name`, top-level when `parent_node_id` is `None`
    ///
    /// # Errors
    ///
    /// * `InvalidInput` - empty or over-long names
    /// * `NotFound` - parent does not exist
    /// * `Conflict` - parent in another tree, or duplicate sibling name
    pub fn create_node(
        &self,
        cancel: &CancellationToken,
        tree_name: &str,
        parent_node_id: Option<i64>,
        node_name: &str,
    ) -> Result<TreeNode> {
        log_op_start!("create_node", tree_name = tree_name, parent_id = parent_node_id);
        let start = std::time::Instant::now();

        let result = self.create_node_impl(cancel, tree_name, parent_node_id, node_name);

        let node = result.map_err(|e| {
            log_op_error!(
                "create_node",
                e,
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "create_node",
            duration_ms = start.elapsed().as_millis() as u64,
            node_id = node.id
        );

        Ok(node)
    }

    fn create_node_impl(
        &self,
        cancel: &CancellationToken,
        tree_name: &str,
        parent_node_id: Option<i64>,
        node_name: &str,
    ) -> Result<TreeNode> {
        validate_tree_name(tree_name)?;
        validate_node_name(node_name)?;

        let conn = self.db.conn()?;
        NodeRepo::create_node(&conn, cancel, tree_name, parent_node_id, node_name)
    }

    /// Delete a node with no children
    ///
    /// # Errors
    ///
    /// * `NotFound` - node does not exist
    /// * `Conflict` - node still has children
    pub fn delete_node(&self, cancel: &CancellationToken, node_id: i64) -> Result<()> {
        log_op_start!("delete_node", node_id = node_id);
        let start = std::time::Instant::now();

        let result = self
            .db
            .conn()
            .and_then(|conn| NodeRepo::delete_node(&conn, cancel, node_id));

        if let Err(e) = &result {
            log_op_error!(
                "delete_node",
                e,
                duration_ms = start.elapsed().as_millis() as u64
            );
        } else {
            log_op_end!(
                "delete_node",
                duration_ms = start.elapsed().as_millis() as u64
            );
        }

        result
    }

    /// Rename a node in place
    ///
    /// # Errors
    ///
    /// * `InvalidInput` - empty or over-long name
    /// * `NotFound` - node does not exist
    /// * `Conflict` - a sibling already has `new_node_name`
    pub fn rename_node(
        &self,
        cancel: &CancellationToken,
        node_id: i64,
        new_node_name: &str,
    ) -> Result<()> {
        log_op_start!("rename_node", node_id = node_id);
        let start = std::time::Instant::now();

        let result = validate_node_name(new_node_name)
            .map_err(ExError::from)
            .and_then(|()| self.db.conn())
            .and_then(|conn| NodeRepo::rename_node(&conn, cancel, node_id, new_node_name));

        if let Err(e) = &result {
            log_op_error!(
                "rename_node",
                e,
                duration_ms = start.elapsed().as_millis() as u64
            );
        } else {
            log_op_end!(
                "rename_node",
                duration_ms = start.elapsed().as_millis() as u64
            );
        }

        result
    }
}
