//! Property tests for tree assembly

use arbor_core::{assemble_tree, TreeNode, TreeView, VIRTUAL_ROOT_ID};
use proptest::prelude::*;
use std::collections::HashMap;

/// Random forest: node i (id i + 1) points to an earlier node or to nothing
fn forest() -> impl Strategy<Value = Vec<TreeNode>> {
    prop::collection::vec(prop::option::of(any::<prop::sample::Index>()), 0..60).prop_map(
        |parents| {
            parents
                .into_iter()
                .enumerate()
                .map(|(i, parent)| {
                    let id = i as i64 + 1;
                    let parent_id = match parent {
                        Some(ix) if i > 0 => Some(ix.index(i) as i64 + 1),
                        _ => None,
                    };
                    TreeNode::new(id, format!("n{}", id), "T".to_string(), parent_id)
                })
                .collect()
        },
    )
}

fn collect_edges(view: &TreeView, edges: &mut HashMap<i64, Option<i64>>) {
    let mut stack = vec![(view, None::<i64>)];
    while let Some((v, parent)) = stack.pop() {
        if v.id != VIRTUAL_ROOT_ID {
            edges.insert(v.id, parent);
        }
        let next_parent = if v.id == VIRTUAL_ROOT_ID { None } else { Some(v.id) };
        for child in &v.children {
            stack.push((child, next_parent));
        }
    }
}

proptest! {
    #[test]
    fn every_row_appears_exactly_once(rows in forest()) {
        let view = assemble_tree("T", rows.clone());
        prop_assert_eq!(view.node_count(), rows.len());
    }

    #[test]
    fn parent_links_are_preserved(rows in forest()) {
        let view = assemble_tree("T", rows.clone());
        let mut edges = HashMap::new();
        collect_edges(&view, &mut edges);

        for row in &rows {
            prop_assert_eq!(edges.get(&row.id).copied(), Some(row.parent_id));
        }
    }

    #[test]
    fn virtual_root_iff_not_exactly_one_top_level(rows in forest()) {
        let top_level = rows.iter().filter(|r| r.parent_id.is_none()).count();
        let view = assemble_tree("T", rows);

        if top_level == 1 {
            prop_assert!(!view.is_virtual());
        } else {
            prop_assert!(view.is_virtual());
            prop_assert_eq!(view.name.as_str(), "T");
            prop_assert_eq!(view.children.len(), top_level);
        }
    }
}
