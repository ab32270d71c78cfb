//! Error types for the canopy tree composition system.

use thiserror::Error;

/// Per-tree resolution faults.
///
/// These never escape a public engine call: the engine reports them and
/// substitutes an error element for the failing tree.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("Unknown tree: {0}")]
    UnknownTree(String),

    #[error("Tree '{tree_id}' is out of sync: {detail}")]
    StructureOutOfSync { tree_id: String, detail: String },

    #[error("Element rule failed on node '{node_id}' in tree '{tree_id}': {message}")]
    RuleEvaluation {
        tree_id: String,
        node_id: String,
        message: String,
    },
}

impl TreeError {
    /// Tree the fault is scoped to, when one is known.
    pub fn tree_id(&self) -> Option<&str> {
        let tree_id = match self {
            TreeError::UnknownTree(id) => id,
            TreeError::StructureOutOfSync { tree_id, .. } => tree_id,
            TreeError::RuleEvaluation { tree_id, .. } => tree_id,
        };
        Some(tree_id.as_str()).filter(|id| !id.is_empty())
    }

    pub(crate) fn out_of_sync(tree_id: &str, detail: impl Into<String>) -> Self {
        TreeError::StructureOutOfSync {
            tree_id: tree_id.to_string(),
            detail: detail.into(),
        }
    }
}

/// Failure raised by an element rule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct RuleError(pub String);

impl RuleError {
    pub fn new(message: impl Into<String>) -> Self {
        RuleError(message.into())
    }
}

/// Load-time validation errors for tree definitions and shared roots.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Duplicate tree id: {0}")]
    DuplicateTree(String),

    #[error("Duplicate node id '{node_id}' in tree '{tree_id}'")]
    DuplicateNode { tree_id: String, node_id: String },

    #[error("Node '{node_id}' in tree '{tree_id}' references unknown parent '{parent_id}'")]
    UnknownParent {
        tree_id: String,
        node_id: String,
        parent_id: String,
    },

    #[error("Node '{node_id}' in tree '{tree_id}' is not reachable from the root")]
    Unreachable { tree_id: String, node_id: String },

    #[error("Node '{node_id}' in tree '{tree_id}' uses unknown rule '{rule}'")]
    UnknownRule {
        tree_id: String,
        node_id: String,
        rule: String,
    },

    #[error("Shared root '{group_id}' references unknown tree '{tree_id}'")]
    UnknownMemberTree { group_id: String, tree_id: String },

    #[error("Duplicate shared root id: {0}")]
    DuplicateSharedRoot(String),

    #[error("Failed to read definitions: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid definition file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors returned to callers of the public API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Shared roots for provider '{provider}' failed to initialize: {message}")]
    Initialization { provider: String, message: String },

    #[error("Operation not supported: {0}")]
    Unsupported(&'static str),

    #[error("Invalid identifier '{input}': {reason}")]
    InvalidIdentifier { input: String, reason: String },

    #[error("Definition error: {0}")]
    Definition(#[from] DefinitionError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
