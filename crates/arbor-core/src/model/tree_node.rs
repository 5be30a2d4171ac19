use serde::{Deserialize, Serialize};

/// Id of a synthesized virtual root
///
/// Never persisted. The store only issues strictly positive ids, so 0 can
/// never name a real node.
pub const VIRTUAL_ROOT_ID: i64 = 0;

/// Deepest hierarchy, in levels below the root, that a read may return
///
/// Rendering a `TreeView` as JSON recurses once per level.
pub const MAX_TREE_DEPTH: usize = 256;

/// One row of the node table
///
/// Trees are partitioned by `tree_name`; `parent_id` points into the same
/// table and `None` marks a top-level node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Store-generated identifier (always > 0)
    pub id: i64,

    /// Node name, unique among its siblings
    pub name: String,

    /// Name of the tree this node belongs to
    pub tree_name: String,

    /// Parent node id, `None` for top-level nodes
    pub parent_id: Option<i64>,
}

impl TreeNode {
    pub fn new(id: i64, name: String, tree_name: String, parent_id: Option<i64>) -> Self {
        Self {
            id,
            name,
            tree_name,
            parent_id,
        }
    }
}

/// A node together with its resolved parent and direct children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeWithRelations {
    pub node: TreeNode,
    pub parent: Option<TreeNode>,
    /// Direct children ordered by id
    pub children: Vec<TreeNode>,
}

impl NodeWithRelations {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Assembled hierarchy returned to callers
///
/// Serializes to the recursive `{id, name, children}` wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeView {
    pub id: i64,
    pub name: String,
    pub children: Vec<TreeView>,
}

impl TreeView {
    /// Whether this view is a synthesized virtual root
    pub fn is_virtual(&self) -> bool {
        self.id == VIRTUAL_ROOT_ID
    }

    /// Number of real nodes in this view, the root included unless virtual
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(view) = stack.pop() {
            if !view.is_virtual() {
                count += 1;
            }
            stack.extend(view.children.iter());
        }
        count
    }

    /// Levels below this view; 0 for a view without children
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((view, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(view.children.iter().map(|c| (c, level + 1)));
        }
        deepest
    }

    /// Find a node by id anywhere in the view
    pub fn find(&self, id: i64) -> Option<&TreeView> {
        let mut stack = vec![self];
        while let Some(view) = stack.pop() {
            if view.id == id {
                return Some(view);
            }
            stack.extend(view.children.iter());
        }
        None
    }
}

impl Drop for TreeView {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut view) = pending.pop() {
            pending.append(&mut view.children);
        }
    }
}
