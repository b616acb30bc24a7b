//! Network-subsystem error type.

use thiserror::Error;

use tc_core::NodeId;

/// Errors produced by `tc-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// An edge names a node that was never added to the builder.
    #[error("edge references undefined node {0:?}")]
    UndefinedNode(String),

    #[error("node {0:?} defined more than once")]
    DuplicateNode(String),

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("invalid edge {from:?} -> {to:?}: {reason}")]
    InvalidEdge { from: String, to: String, reason: String },

    #[error("edge {from:?} -> {to:?} defined more than once")]
    DuplicateEdge { from: String, to: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
