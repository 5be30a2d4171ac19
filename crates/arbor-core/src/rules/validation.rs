//! Input validation for tree operations
//!
//! Names map onto `TEXT` columns capped at `MAX_NAME_LEN` characters.

use crate::errors::{ArborError, Result};

/// Maximum length, in characters, of tree and node names
pub const MAX_NAME_LEN: usize = 500;

/// Validate a tree name
///
/// # Errors
///
/// Returns `InvalidName` if the name is blank or longer than `MAX_NAME_LEN`.
pub fn validate_tree_name(name: &str) -> Result<()> {
    validate_name("tree name", name)
}

/// Validate a node name
///
/// # Errors
///
/// Returns `InvalidName` if the name is blank or longer than `MAX_NAME_LEN`.
pub fn validate_node_name(name: &str) -> Result<()> {
    validate_name("node name", name)
}

/// Validate journal pagination arguments
///
/// # Errors
///
/// Returns `InvalidPaging` if `take` is zero or either value exceeds `i64::MAX`.
pub fn validate_paging(skip: u64, take: u64) -> Result<()> {
    if take == 0 {
        return Err(ArborError::InvalidPaging {
            reason: "take must be greater than zero".to_string(),
        });
    }
    if i64::try_from(skip).is_err() || i64::try_from(take).is_err() {
        return Err(ArborError::InvalidPaging {
            reason: "skip and take must fit in a signed 64-bit integer".to_string(),
        });
    }
    Ok(())
}

fn validate_name(field: &'static str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ArborError::InvalidName {
            field,
            reason: "cannot be empty or whitespace-only".to_string(),
        });
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(ArborError::InvalidName {
            field,
            reason: format!("{} characters exceeds the limit of {}", len, MAX_NAME_LEN),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_regular_names() {
        assert!(validate_tree_name("T1").is_ok());
        assert!(validate_node_name("Root Node").is_ok());
    }

    #[test]
    fn test_rejects_blank_names() {
        let err = validate_node_name("   ").unwrap_err();
        assert!(matches!(err, ArborError::InvalidName { field: "node name", .. }));
        assert!(validate_tree_name("").is_err());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let at_limit: String = "é".repeat(MAX_NAME_LEN);
        assert!(validate_node_name(&at_limit).is_ok());

        let over: String = "a".repeat(MAX_NAME_LEN + 1);
        let err = validate_tree_name(&over).unwrap_err();
        assert!(err.to_string().contains("501 characters"));
    }

    #[test]
    fn test_paging_rejects_zero_take() {
        assert!(validate_paging(0, 10).is_ok());
        assert!(matches!(
            validate_paging(0, 0),
            Err(ArborError::InvalidPaging { .. })
        ));
        assert!(validate_paging(u64::MAX, 1).is_err());
    }
}
