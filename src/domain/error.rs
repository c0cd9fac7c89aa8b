//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::NodeId;

/// Domain errors are violations of the MRCA resolver's contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("tree has no root")]
    EmptyTree,

    #[error("input tree is not rooted (root has {degree} neighbors, expected 2)")]
    NotRooted { degree: usize },

    #[error("interior node '{name}' has a single child")]
    UnaryNode { name: String },

    #[error("no tips found matching regex")]
    EmptySelection,

    #[error("selected node is not a tip of this tree: {0:?}")]
    ForeignTip(NodeId),

    #[error("MRCA node has no name")]
    UnnamedMrca,
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
