//! Node table repository
//!
//! Every mutation touches exactly one row. Sibling-name checks run before the
//! write as a fast path; the unique index on
//! `(tree_name, IFNULL(parent_id, 0), name)` is the authoritative guard, and
//! its violation is reported as the same conflict the pre-check would give.

use crate::errors::{
    ensure_active, from_rusqlite, is_foreign_key_violation, is_unique_violation, Result,
};
use arbor_core::errors::{ArborError, ExError};
use arbor_core::model::{NodeWithRelations, TreeNode};
use arbor_core_types::CancellationToken;
use rusqlite::{params, Connection, OptionalExtension, Row};

const NODE_COLUMNS: &str = "id, name, tree_name, parent_id";

/// SQLite repository for tree nodes
pub struct NodeRepo;

impl NodeRepo {
    /// Insert a node under `parent_id` (or at top level) in `tree_name`
    ///
    /// # Errors
    ///
    /// * `NotFound` - parent does not exist
    /// * `Conflict` - parent belongs to another tree, or a sibling already
    ///   has `name`
    pub fn create_node(
        conn: &Connection,
        cancel: &CancellationToken,
        tree_name: &str,
        parent_id: Option<i64>,
        name: &str,
    ) -> Result<TreeNode> {
        ensure_active(cancel, "create_node")?;

        match parent_id {
            Some(parent_id) => {
                let parent = Self::find(conn, parent_id)?
                    .ok_or(ArborError::ParentNotFound { parent_id })?;

                if parent.tree_name != tree_name {
                    return Err(ArborError::ParentInWrongTree {
                        parent_id,
                        tree_name: tree_name.to_string(),
                    }
                    .into());
                }

                if Self::child_name_taken(conn, parent_id, name, None)? {
                    return Err(duplicate_error(tree_name, Some(parent_id), name));
                }
            }
            None => {
                if Self::root_name_taken(conn, tree_name, name, None)? {
                    return Err(duplicate_error(tree_name, None, name));
                }
            }
        }

        ensure_active(cancel, "create_node")?;

        conn.execute(
            "INSERT INTO tree_nodes (name, tree_name, parent_id) VALUES (?1, ?2, ?3)",
            params![name, tree_name, parent_id],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_error(tree_name, parent_id, name)
            } else if is_foreign_key_violation(&e) {
                // Parent vanished between the check and the insert
                ArborError::ParentNotFound {
                    parent_id: parent_id.unwrap_or_default(),
                }
                .into()
            } else {
                from_rusqlite(e)
            }
        })?;

        Ok(TreeNode::new(
            conn.last_insert_rowid(),
            name.to_string(),
            tree_name.to_string(),
            parent_id,
        ))
    }

    /// Delete a node that has no children
    ///
    /// The child check and the delete are one statement, so a child inserted
    /// concurrently is never removed by the cascade.
    ///
    /// # Errors
    ///
    /// * `NotFound` - node does not exist
    /// * `Conflict` - node has children
    pub fn delete_node(conn: &Connection, cancel: &CancellationToken, node_id: i64) -> Result<()> {
        ensure_active(cancel, "delete_node")?;

        let removed = conn
            .execute(
                "DELETE FROM tree_nodes
                 WHERE id = ?1
                   AND NOT EXISTS (SELECT 1 FROM tree_nodes WHERE parent_id = ?1)",
                [node_id],
            )
            .map_err(from_rusqlite)?;

        if removed == 1 {
            return Ok(());
        }

        if Self::find(conn, node_id)?.is_none() {
            return Err(ArborError::NodeNotFound { node_id }.into());
        }

        let child_count = Self::count_children(conn, node_id)?;
        Err(ArborError::DeleteWithChildren {
            node_id,
            child_count,
        }
        .into())
    }

    /// Rename a node in place
    ///
    /// # Errors
    ///
    /// * `NotFound` - node does not exist
    /// * `Conflict` - another sibling already has `new_name`
    pub fn rename_node(
        conn: &Connection,
        cancel: &CancellationToken,
        node_id: i64,
        new_name: &str,
    ) -> Result<()> {
        ensure_active(cancel, "rename_node")?;

        let node = Self::find(conn, node_id)?.ok_or(ArborError::NodeNotFound { node_id })?;

        let taken = match node.parent_id {
            Some(parent_id) => Self::child_name_taken(conn, parent_id, new_name, Some(node_id))?,
            None => Self::root_name_taken(conn, &node.tree_name, new_name, Some(node_id))?,
        };
        if taken {
            return Err(duplicate_error(&node.tree_name, node.parent_id, new_name));
        }

        ensure_active(cancel, "rename_node")?;

        let updated = conn
            .execute(
                "UPDATE tree_nodes SET name = ?1 WHERE id = ?2",
                params![new_name, node_id],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    duplicate_error(&node.tree_name, node.parent_id, new_name)
                } else {
                    from_rusqlite(e)
                }
            })?;

        if updated == 0 {
            return Err(ArborError::NodeNotFound { node_id }.into());
        }

        Ok(())
    }

    /// Fetch every row of one tree in a single query, ordered by id
    ///
    /// An empty vector means the tree has no rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the token is cancelled.
    pub fn load_tree(
        conn: &Connection,
        cancel: &CancellationToken,
        tree_name: &str,
    ) -> Result<Vec<TreeNode>> {
        ensure_active(cancel, "load_tree")?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM tree_nodes WHERE tree_name = ? ORDER BY id",
                NODE_COLUMNS
            ))
            .map_err(from_rusqlite)?;

        let nodes = stmt
            .query_map([tree_name], map_node)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        Ok(nodes)
    }

    /// Fetch a node with its parent and direct children resolved
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or the token is cancelled.
    pub fn get_node(
        conn: &Connection,
        cancel: &CancellationToken,
        node_id: i64,
    ) -> Result<Option<NodeWithRelations>> {
        ensure_active(cancel, "get_node")?;

        let Some(node) = Self::find(conn, node_id)? else {
            return Ok(None);
        };

        let parent = match node.parent_id {
            Some(parent_id) => Self::find(conn, parent_id)?,
            None => None,
        };

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM tree_nodes WHERE parent_id = ? ORDER BY id",
                NODE_COLUMNS
            ))
            .map_err(from_rusqlite)?;
        let children = stmt
            .query_map([node_id], map_node)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        Ok(Some(NodeWithRelations {
            node,
            parent,
            children,
        }))
    }

    fn find(conn: &Connection, node_id: i64) -> Result<Option<TreeNode>> {
        conn.query_row(
            &format!("SELECT {} FROM tree_nodes WHERE id = ?", NODE_COLUMNS),
            [node_id],
            map_node,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    fn count_children(conn: &Connection, node_id: i64) -> Result<usize> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM tree_nodes WHERE parent_id = ?",
                [node_id],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn child_name_taken(
        conn: &Connection,
        parent_id: i64,
        name: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM tree_nodes
                WHERE parent_id = ?1 AND name = ?2 AND (?3 IS NULL OR id != ?3)
            )",
            params![parent_id, name, exclude_id],
            |row| row.get(0),
        )
        .map_err(from_rusqlite)
    }

    fn root_name_taken(
        conn: &Connection,
        tree_name: &str,
        name: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM tree_nodes
                WHERE tree_name = ?1 AND parent_id IS NULL AND name = ?2
                  AND (?3 IS NULL OR id != ?3)
            )",
            params![tree_name, name, exclude_id],
            |row| row.get(0),
        )
        .map_err(from_rusqlite)
    }
}

fn map_node(row: &Row<'_>) -> rusqlite::Result<TreeNode> {
    Ok(TreeNode {
        id: row.get(0)?,
        name: row.get(1)?,
        tree_name: row.get(2)?,
        parent_id: row.get(3)?,
    })
}

fn duplicate_error(tree_name: &str, parent_id: Option<i64>, name: &str) -> ExError {
    match parent_id {
        Some(parent_id) => ArborError::DuplicateSiblingName {
            parent_id,
            name: name.to_string(),
        },
        None => ArborError::DuplicateRootName {
            tree_name: tree_name.to_string(),
            name: name.to_string(),
        },
    }
    .into()
}
