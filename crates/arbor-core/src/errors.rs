use arbor_core_types::RequestId;
use thiserror::Error;

/// Result type alias using ArborError
pub type Result<T> = std::result::Result<T, ArborError>;

/// Coarse classification of every failure
///
/// Each kind maps to a stable `ERR_*` code. The kind also decides whether a
/// failure is "secure": safe to echo verbatim to the caller. Secure kinds
/// describe caller mistakes and contain no internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // Caller-facing
    NotFound,
    Conflict,
    InvalidInput,

    // Storage
    Unavailable,
    Persistence,
    Serialization,

    // Control flow
    Cancelled,

    // Internal
    Panic,
    Internal,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "ERR_NOT_FOUND",
            ErrorKind::Conflict => "ERR_CONFLICT",
            ErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ErrorKind::Unavailable => "ERR_UNAVAILABLE",
            ErrorKind::Persistence => "ERR_PERSISTENCE",
            ErrorKind::Serialization => "ERR_SERIALIZATION",
            ErrorKind::Cancelled => "ERR_CANCELLED",
            ErrorKind::Panic => "ERR_PANIC",
            ErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Name recorded as the exception kind in the journal
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::Unavailable => "Unavailable",
            ErrorKind::Persistence => "Persistence",
            ErrorKind::Serialization => "Serialization",
            ErrorKind::Cancelled => "Cancelled",
            ErrorKind::Panic => "Panic",
            ErrorKind::Internal => "Internal",
        }
    }

    /// Whether the message of this kind may be shown to the caller
    pub fn is_secure(&self) -> bool {
        matches!(
            self,
            ErrorKind::NotFound | ErrorKind::Conflict | ErrorKind::InvalidInput
        )
    }
}

/// Where an error happened
#[derive(Debug, Clone, Default, PartialEq)]
struct Origin {
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
}

/// Classified error carried across crate boundaries
///
/// The kind drives the caller-facing response; the origin and the source
/// chain end up in the exception journal through [`ExError::trace`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExError {
    kind: ErrorKind,
    message: String,
    origin: Origin,
    source: Option<Box<ExError>>,
}

impl ExError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: String::new(),
            origin: Origin::default(),
            source: None,
        }
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.origin.op = Some(op.into());
        self
    }

    /// Id of the node, parent, or journal row involved
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.origin.entity_id = Some(id.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.origin.request_id = Some(request_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn is_secure(&self) -> bool {
        self.kind.is_secure()
    }

    /// Caller-facing text; empty when only a kind was given
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn op(&self) -> Option<&str> {
        self.origin.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.origin.entity_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.origin.request_id.as_ref()
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    /// This error followed by its causes, one per line
    ///
    /// Stored as the stack trace column of the exception journal.
    pub fn trace(&self) -> String {
        std::iter::successors(Some(self), |e| e.source_error())
            .enumerate()
            .map(|(depth, e)| match depth {
                0 => format!("at {}", e),
                _ => format!("caused by {}", e),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = self.op() {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(id) = self.entity_id() {
            write!(f, " (entity_id: {})", id)?;
        }
        if let Some(request_id) = self.request_id() {
            write!(f, " [request {}]", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.source {
            Some(inner) => Some(&**inner),
            None => None,
        }
    }
}

/// Domain error taxonomy for tree and journal operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArborError {
    // Lookups
    /// Node does not exist
    #[error("Node with ID {node_id} not found.")]
    NodeNotFound { node_id: i64 },

    /// Parent referenced by a create does not exist
    #[error("Parent node with ID {parent_id} not found.")]
    ParentNotFound { parent_id: i64 },

    /// Parent referenced by a create lives in a different tree
    #[error("Parent node does not belong to tree '{tree_name}'.")]
    ParentInWrongTree { parent_id: i64, tree_name: String },

    /// Journal entry does not exist
    #[error("Journal entry with ID {journal_id} not found.")]
    JournalEntryNotFound { journal_id: i64 },

    // Tree shape
    /// A sibling under the same parent already uses the name
    #[error("A node with name '{name}' already exists among siblings.")]
    DuplicateSiblingName { parent_id: i64, name: String },

    /// A top-level node of the tree already uses the name
    #[error("A root node with name '{name}' already exists in tree '{tree_name}'.")]
    DuplicateRootName { tree_name: String, name: String },

    /// Cannot delete a node that still has children
    #[error("You have to delete all children nodes first.")]
    DeleteWithChildren { node_id: i64, child_count: usize },

    // Arguments
    /// Tree or node name is empty or too long
    #[error("Invalid {field}: {reason}")]
    InvalidName { field: &'static str, reason: String },

    /// Pagination arguments are out of range
    #[error("Invalid paging: {reason}")]
    InvalidPaging { reason: String },

    /// Storage could not be reached
    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },

    /// Operation was cancelled before completion
    #[error("Operation '{op}' was cancelled")]
    Cancelled { op: String },

    /// A response could not be encoded
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// The assembled tree is deeper than a read may return
    #[error("Tree '{tree_name}' is {depth} levels deep; at most {limit} can be returned")]
    TreeTooDeep {
        tree_name: String,
        depth: usize,
        limit: usize,
    },
}

/// Conversion from ArborError to ExError
///
/// The message is the domain error's Display text, which is what a secure
/// failure shows to the caller.
impl From<ArborError> for ExError {
    fn from(err: ArborError) -> Self {
        let message = err.to_string();
        match err {
            ArborError::NodeNotFound { node_id } => ExError::new(ErrorKind::NotFound)
                .with_entity_id(node_id.to_string())
                .with_message(message),
            ArborError::ParentNotFound { parent_id } => ExError::new(ErrorKind::NotFound)
                .with_entity_id(parent_id.to_string())
                .with_op("find_parent")
                .with_message(message),
            ArborError::JournalEntryNotFound { journal_id } => ExError::new(ErrorKind::NotFound)
                .with_entity_id(journal_id.to_string())
                .with_message(message),
            ArborError::ParentInWrongTree { parent_id, .. } => ExError::new(ErrorKind::Conflict)
                .with_entity_id(parent_id.to_string())
                .with_message(message),
            ArborError::DuplicateSiblingName { parent_id, .. } => {
                ExError::new(ErrorKind::Conflict)
                    .with_entity_id(parent_id.to_string())
                    .with_message(message)
            }
            ArborError::DuplicateRootName { tree_name, .. } => ExError::new(ErrorKind::Conflict)
                .with_entity_id(tree_name)
                .with_message(message),
            ArborError::DeleteWithChildren { node_id, .. } => ExError::new(ErrorKind::Conflict)
                .with_entity_id(node_id.to_string())
                .with_message(message),
            ArborError::InvalidName { .. } | ArborError::InvalidPaging { .. } => {
                ExError::new(ErrorKind::InvalidInput).with_message(message)
            }
            ArborError::StorageUnavailable { .. } => {
                ExError::new(ErrorKind::Unavailable).with_message(message)
            }
            ArborError::Cancelled { op } => ExError::new(ErrorKind::Cancelled)
                .with_op(op)
                .with_message(message),
            ArborError::Serialization { .. } => {
                ExError::new(ErrorKind::Serialization).with_message(message)
            }
            ArborError::TreeTooDeep { tree_name, .. } => ExError::new(ErrorKind::Internal)
                .with_op("get_tree")
                .with_entity_id(tree_name)
                .with_message(message),
        }
    }
}

impl From<serde_json::Error> for ArborError {
    fn from(err: serde_json::Error) -> Self {
        ArborError::Serialization {
            message: err.to_string(),
        }
    }
}
