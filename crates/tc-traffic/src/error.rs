use thiserror::Error;

use tc_core::{EdgeId, NodeId, VehicleId};

#[derive(Debug, Error)]
pub enum TrafficError {
    #[error("trip of {vehicle} references {node}, which is not in the network")]
    UnknownNode { vehicle: VehicleId, node: NodeId },

    #[error("{0} not found in network")]
    EdgeNotFound(EdgeId),

    #[error("capacity multiplier for {edge} must be finite and non-negative, got {multiplier}")]
    InvalidMultiplier { edge: EdgeId, multiplier: f64 },

    #[error("invalid BPR parameters: {0}")]
    InvalidParams(String),
}

pub type TrafficResult<T> = Result<T, TrafficError>;
