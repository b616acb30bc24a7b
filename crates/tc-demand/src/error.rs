use thiserror::Error;

use tc_core::NodeId;

#[derive(Debug, Error)]
pub enum DemandError {
    #[error("trip file parse error: {0}")]
    Parse(String),

    #[error("unknown node name {0:?} in trip file")]
    UnknownNode(String),

    #[error("{0} is not a node of the network")]
    NodeNotFound(NodeId),

    #[error("invalid demand config: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DemandResult<T> = Result<T, DemandError>;
