// Integration tests for the node repository

use arbor_core::ErrorKind;
use arbor_core_types::CancellationToken;
use arbor_store::{Database, NodeRepo, StoreConfig};
use std::sync::{Arc, Barrier};
use std::thread;

fn setup() -> (Database, CancellationToken) {
    (Database::open_in_memory().unwrap(), CancellationToken::new())
}

#[test]
fn test_create_and_load_tree() {
    // Given: A root with two children
    let (db, cancel) = setup();
    let conn = db.conn().unwrap();
    let root = NodeRepo::create_node(&conn, &cancel, "T1", None, "root").unwrap();
    let b = NodeRepo::create_node(&conn, &cancel, "T1", Some(root.id), "b").unwrap();
    let a = NodeRepo::create_node(&conn, &cancel, "T1", Some(root.id), "a").unwrap();

    // When: The tree is loaded
    let rows = NodeRepo::load_tree(&conn, &cancel, "T1").unwrap();

    // Then: Every row is returned in id order
    let ids: Vec<i64> = rows.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![root.id, b.id, a.id]);
    assert_eq!(rows[1].parent_id, Some(root.id));
}

#[test]
fn test_load_unknown_tree_is_empty() {
    let (db, cancel) = setup();
    let conn = db.conn().unwrap();

    assert!(NodeRepo::load_tree(&conn, &cancel, "missing").unwrap().is_empty());
}

#[test]
fn test_create_under_missing_parent_is_not_found() {
    let (db, cancel) = setup();
    let conn = db.conn().unwrap();

    let err = NodeRepo::create_node(&conn, &cancel, "T1", Some(42), "A").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.message(), "Parent node with ID 42 not found.");
}

#[test]
fn test_create_under_parent_of_other_tree_is_conflict() {
    let (db, cancel) = setup();
    let conn = db.conn().unwrap();
    let other = NodeRepo::create_node(&conn, &cancel, "T2", None, "A").unwrap();

    let err = NodeRepo::create_node(&conn, &cancel, "T1", Some(other.id), "B").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.message(), "Parent node does not belong to tree 'T1'.");
}

#[test]
fn test_duplicate_sibling_is_conflict() {
    let (db, cancel) = setup();
    let conn = db.conn().unwrap();
    let root = NodeRepo::create_node(&conn, &cancel, "T1", None, "root").unwrap();
    NodeRepo::create_node(&conn, &cancel, "T1", Some(root.id), "A").unwrap();

    let err = NodeRepo::create_node(&conn, &cancel, "T1", Some(root.id), "A").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(
        err.message(),
        "A node with name 'A' already exists among siblings."
    );
}

#[test]
fn test_duplicate_top_level_is_conflict() {
    let (db, cancel) = setup();
    let conn = db.conn().unwrap();
    NodeRepo::create_node(&conn, &cancel, "T1", None, "A").unwrap();

    let err = NodeRepo::create_node(&conn, &cancel, "T1", None, "A").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let rows = NodeRepo::load_tree(&conn, &cancel, "T1").unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn test_delete_leaf_removes_exactly_one_row() {
    let (db, cancel) = setup();
    let conn = db.conn().unwrap();
    let root = NodeRepo::create_node(&conn, &cancel, "T1", None, "root").unwrap();
    let leaf = NodeRepo::create_node(&conn, &cancel, "T1", Some(root.id), "leaf").unwrap();
    NodeRepo::create_node(&conn, &cancel, "T1", Some(root.id), "other").unwrap();

    NodeRepo::delete_node(&conn, &cancel, leaf.id).unwrap();

    let rows = NodeRepo::load_tree(&conn, &cancel, "T1").unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|n| n.id != leaf.id));
}

#[test]
fn test_delete_with_children_is_conflict() {
    let (db, cancel) = setup();
    let conn = db.conn().unwrap();
    let root = NodeRepo::create_node(&conn, &cancel, "T1", None, "root").unwrap();
    NodeRepo::create_node(&conn, &cancel, "T1", Some(root.id), "child").unwrap();

    let err = NodeRepo::delete_node(&conn, &cancel, root.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.message(), "You have to delete all children nodes first.");
    assert_eq!(NodeRepo::load_tree(&conn, &cancel, "T1").unwrap().len(), 2);
}

#[test]
fn test_delete_missing_is_not_found() {
    let (db, cancel) = setup();
    let conn = db.conn().unwrap();

    let err = NodeRepo::delete_node(&conn, &cancel, 7).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.message(), "Node with ID 7 not found.");
}

#[test]
fn test_rename_onto_sibling_is_conflict() {
    let (db, cancel) = setup();
    let conn = db.conn().unwrap();
    let root = NodeRepo::create_node(&conn, &cancel, "T1", None, "root").unwrap();
    NodeRepo::create_node(&conn, &cancel, "T1", Some(root.id), "A").unwrap();
    let b = NodeRepo::create_node(&conn, &cancel, "T1", Some(root.id), "B").unwrap();

    let err = NodeRepo::rename_node(&conn, &cancel, b.id, "A").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn test_rename_to_own_name_and_unique_name() {
    let (db, cancel) = setup();
    let conn = db.conn().unwrap();
    let root = NodeRepo::create_node(&conn, &cancel, "T1", None, "root").unwrap();

    NodeRepo::rename_node(&conn, &cancel, root.id, "root").unwrap();
    NodeRepo::rename_node(&conn, &cancel, root.id, "renamed").unwrap();

    let node = NodeRepo::get_node(&conn, &cancel, root.id).unwrap().unwrap();
    assert_eq!(node.node.name, "renamed");
}

#[test]
fn test_rename_missing_is_not_found() {
    let (db, cancel) = setup();
    let conn = db.conn().unwrap();

    let err = NodeRepo::rename_node(&conn, &cancel, 99, "x").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_get_node_resolves_relations() {
    let (db, cancel) = setup();
    let conn = db.conn().unwrap();
    let root = NodeRepo::create_node(&conn, &cancel, "T1", None, "root").unwrap();
    let mid = NodeRepo::create_node(&conn, &cancel, "T1", Some(root.id), "mid").unwrap();
    NodeRepo::create_node(&conn, &cancel, "T1", Some(mid.id), "leaf").unwrap();

    let found = NodeRepo::get_node(&conn, &cancel, mid.id).unwrap().unwrap();
    assert_eq!(found.parent.as_ref().map(|p| p.id), Some(root.id));
    assert_eq!(found.children.len(), 1);
    assert!(found.has_children());

    assert!(NodeRepo::get_node(&conn, &cancel, 1000).unwrap().is_none());
}

#[test]
fn test_storage_cascade_removes_subtree() {
    // Given: A three-level chain
    let (db, cancel) = setup();
    let conn = db.conn().unwrap();
    let root = NodeRepo::create_node(&conn, &cancel, "T1", None, "root").unwrap();
    let mid = NodeRepo::create_node(&conn, &cancel, "T1", Some(root.id), "mid").unwrap();
    NodeRepo::create_node(&conn, &cancel, "T1", Some(mid.id), "leaf").unwrap();

    // When: The root row is removed below the repository
    conn.execute("DELETE FROM tree_nodes WHERE id = ?", [root.id])
        .unwrap();

    // Then: The foreign key cascade removes the descendants
    assert!(NodeRepo::load_tree(&conn, &cancel, "T1").unwrap().is_empty());
}

#[test]
fn test_concurrent_duplicate_create_persists_one_row() {
    // Given: A file-backed pool shared by several threads
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(&StoreConfig::at(dir.path().join("race.db"))).unwrap();
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    // When: Every thread creates the same top-level name at once
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let db = db.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let cancel = CancellationToken::new();
                let conn = db.conn().unwrap();
                barrier.wait();
                NodeRepo::create_node(&conn, &cancel, "T1", None, "A")
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // Then: Exactly one wins and the rest see Conflict
    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.kind(), ErrorKind::Conflict, "unexpected: {}", err);
    }

    let conn = db.conn().unwrap();
    let rows = NodeRepo::load_tree(&conn, &CancellationToken::new(), "T1").unwrap();
    assert_eq!(rows.len(), 1);
}
