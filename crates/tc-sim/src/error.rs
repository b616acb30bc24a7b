use tc_core::{CoreError, EdgeId, Tick};
use tc_network::NetworkError;
use tc_traffic::TrafficError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("{tick} is past the ledger horizon of {horizon} minutes")]
    PastHorizon {
        tick:    Tick,
        horizon: usize,
    },

    #[error("no congestion was recorded after warm-up; nothing to compare")]
    NoCongestion,

    #[error("capacity multiplier for {0} given twice")]
    DuplicateOverride(EdgeId),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("traffic error: {0}")]
    Traffic(#[from] TrafficError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),
}

pub type SimResult<T> = Result<T, SimError>;
