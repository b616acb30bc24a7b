//! Demand records handed to the simulator before a run.

use crate::{NodeId, Tick};

/// One vehicle's travel demand: where it appears, where it wants to go, and
/// the minute it appears.
///
/// Demand generators produce `Vec<Trip>`; the simulator assigns
/// `VehicleId(i)` to `trips[i]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trip {
    pub origin:      NodeId,
    pub destination: NodeId,
    pub spawn:       Tick,
}

impl Trip {
    pub fn new(origin: NodeId, destination: NodeId, spawn: Tick) -> Self {
        Self { origin, destination, spawn }
    }

    /// `true` if the trip starts at its own destination.
    #[inline]
    pub fn is_trivial(&self) -> bool {
        self.origin == self.destination
    }
}
