use arbor_core::errors::{ArborError, ErrorKind, ExError};

#[test]
fn test_node_not_found_verifiable_by_kind() {
    let ex_err: ExError = ArborError::NodeNotFound { node_id: 17 }.into();

    assert_eq!(ex_err.kind(), ErrorKind::NotFound);
    assert_eq!(ex_err.code(), "ERR_NOT_FOUND");
    assert_eq!(ex_err.entity_id(), Some("17"));
    assert_eq!(ex_err.message(), "Node with ID 17 not found.");
}

#[test]
fn test_parent_not_found_carries_op() {
    let ex_err: ExError = ArborError::ParentNotFound { parent_id: 4 }.into();

    assert_eq!(ex_err.kind(), ErrorKind::NotFound);
    assert_eq!(ex_err.op(), Some("find_parent"));
    assert_eq!(ex_err.message(), "Parent node with ID 4 not found.");
}

#[test]
fn test_structural_violations_are_conflicts() {
    let cases = vec![
        ArborError::ParentInWrongTree {
            parent_id: 1,
            tree_name: "T2".to_string(),
        },
        ArborError::DuplicateSiblingName {
            parent_id: 1,
            name: "A".to_string(),
        },
        ArborError::DuplicateRootName {
            tree_name: "T1".to_string(),
            name: "A".to_string(),
        },
        ArborError::DeleteWithChildren {
            node_id: 1,
            child_count: 2,
        },
    ];

    for err in cases {
        let ex_err: ExError = err.into();
        assert_eq!(ex_err.kind(), ErrorKind::Conflict);
        assert!(ex_err.is_secure());
    }
}

#[test]
fn test_conflict_messages_are_caller_readable() {
    let ex_err: ExError = ArborError::DuplicateRootName {
        tree_name: "T1".to_string(),
        name: "A".to_string(),
    }
    .into();
    assert_eq!(
        ex_err.message(),
        "A root node with name 'A' already exists in tree 'T1'."
    );

    let ex_err: ExError = ArborError::DeleteWithChildren {
        node_id: 3,
        child_count: 1,
    }
    .into();
    assert_eq!(ex_err.message(), "You have to delete all children nodes first.");
}

#[test]
fn test_storage_failures_are_not_secure() {
    let unavailable: ExError = ArborError::StorageUnavailable {
        message: "pool timed out".to_string(),
    }
    .into();
    assert_eq!(unavailable.kind(), ErrorKind::Unavailable);
    assert!(!unavailable.is_secure());

    let cancelled: ExError = ArborError::Cancelled {
        op: "load_tree".to_string(),
    }
    .into();
    assert_eq!(cancelled.kind(), ErrorKind::Cancelled);
    assert_eq!(cancelled.op(), Some("load_tree"));
    assert!(!cancelled.is_secure());
}

#[test]
fn test_validation_errors_are_invalid_input() {
    let ex_err: ExError = ArborError::InvalidName {
        field: "node name",
        reason: "cannot be empty or whitespace-only".to_string(),
    }
    .into();

    assert_eq!(ex_err.kind(), ErrorKind::InvalidInput);
    assert!(ex_err.is_secure());
}

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (ErrorKind::NotFound, "ERR_NOT_FOUND"),
        (ErrorKind::Conflict, "ERR_CONFLICT"),
        (ErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
        (ErrorKind::Unavailable, "ERR_UNAVAILABLE"),
        (ErrorKind::Cancelled, "ERR_CANCELLED"),
        (ErrorKind::Panic, "ERR_PANIC"),
        (ErrorKind::Internal, "ERR_INTERNAL"),
    ];

    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
    }
}

#[test]
fn test_serde_error_converts_to_serialization() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: ArborError = json_err.into();
    let ex_err: ExError = err.into();
    assert_eq!(ex_err.kind(), ErrorKind::Serialization);
}

#[test]
fn test_tree_too_deep_is_internal_and_not_secure() {
    let ex_err: ExError = ArborError::TreeTooDeep {
        tree_name: "Deep".to_string(),
        depth: 5_000,
        limit: 256,
    }
    .into();

    assert_eq!(ex_err.kind(), ErrorKind::Internal);
    assert!(!ex_err.is_secure());
    assert_eq!(ex_err.entity_id(), Some("Deep"));
    assert_eq!(
        ex_err.message(),
        "Tree 'Deep' is 5000 levels deep; at most 256 can be returned"
    );
}
