//! Tree assembly
//!
//! Turns the flat row set of one tree into a `TreeView` hierarchy. The rows
//! are placed in an arena and linked by index in a single grouping pass; no
//! per-node lookups against the store are needed.
//!
//! Rules:
//! - a row whose parent is `None`, or whose parent is not among the rows, is
//!   top-level (a dangling reference is promoted rather than failing the read)
//! - exactly one top-level row becomes the root
//! - zero or several top-level rows are gathered under a virtual root with
//!   id `VIRTUAL_ROOT_ID` named after the tree
//! - siblings are ordered by id

use std::collections::HashMap;

use crate::model::{TreeNode, TreeView, VIRTUAL_ROOT_ID};

/// Empty virtual root for a tree that has no rows
pub fn virtual_root(tree_name: &str) -> TreeView {
    TreeView {
        id: VIRTUAL_ROOT_ID,
        name: tree_name.to_string(),
        children: Vec::new(),
    }
}

/// Assemble the rows of one tree into a hierarchy
pub fn assemble_tree(tree_name: &str, mut nodes: Vec<TreeNode>) -> TreeView {
    nodes.sort_by_key(|n| n.id);

    let index: HashMap<i64, usize> = nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut top_level: Vec<usize> = Vec::new();

    for (i, node) in nodes.iter().enumerate() {
        match node.parent_id.and_then(|p| index.get(&p)) {
            Some(&parent) if parent != i => children[parent].push(i),
            _ => top_level.push(i),
        }
    }

    // Rows caught in a parent cycle are unreachable from any top-level row.
    // Promote the lowest unreached id until every row is placed.
    let mut order = breadth_first(&top_level, &children, nodes.len());
    if order.len() < nodes.len() {
        let mut reached = vec![false; nodes.len()];
        for &i in &order {
            reached[i] = true;
        }
        for i in 0..nodes.len() {
            if reached[i] {
                continue;
            }
            detach(&mut children, i);
            top_level.push(i);
            for j in breadth_first(&[i], &children, nodes.len()) {
                if !reached[j] {
                    reached[j] = true;
                    order.push(j);
                }
            }
        }
        top_level.sort_unstable();
    }

    // Children always appear after their parent in `order`, so building in
    // reverse has every child view ready before its parent is built.
    let mut built: Vec<Option<TreeView>> = vec![None; nodes.len()];
    for &i in order.iter().rev() {
        let kids = children[i]
            .iter()
            .filter_map(|&c| built[c].take())
            .collect();
        built[i] = Some(TreeView {
            id: nodes[i].id,
            name: nodes[i].name.clone(),
            children: kids,
        });
    }

    let mut roots: Vec<TreeView> = top_level.iter().filter_map(|&i| built[i].take()).collect();

    if roots.len() == 1 {
        return roots.remove(0);
    }

    TreeView {
        id: VIRTUAL_ROOT_ID,
        name: tree_name.to_string(),
        children: roots,
    }
}

fn breadth_first(starts: &[usize], children: &[Vec<usize>], len: usize) -> Vec<usize> {
    let mut seen = vec![false; len];
    let mut order = Vec::with_capacity(len);
    for &s in starts {
        if !seen[s] {
            seen[s] = true;
            order.push(s);
        }
    }
    let mut cursor = 0;
    while cursor < order.len() {
        let current = order[cursor];
        cursor += 1;
        for &c in &children[current] {
            if !seen[c] {
                seen[c] = true;
                order.push(c);
            }
        }
    }
    order
}

fn detach(children: &mut [Vec<usize>], node: usize) {
    for list in children.iter_mut() {
        list.retain(|&c| c != node);
    }
}
