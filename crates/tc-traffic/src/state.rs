//! Per-vehicle lifecycle state.

use tc_core::{EdgeId, NodeId, Tick, Trip, VehicleId};
use tc_network::Trajectory;

/// Where a vehicle is in its lifecycle.
///
/// ```text
/// Unspawned ─┬─> Waiting ──> Traveling <──> AtEdgeEnd ──> Arrived
///            ├─> Arrived            (origin == destination)
///            └─> Unroutable         (no path; never revisited)
/// ```
///
/// Times inside `Traveling` and `AtEdgeEnd` are continuous minutes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum VehicleState {
    /// Spawn minute not reached yet.
    Unspawned,
    /// Routed and waiting at `node` for room on the first edge.
    Waiting { node: NodeId },
    /// On `edge`, not yet at its end.
    Traveling { edge: EdgeId, entered_at: f64 },
    /// Reached the end of `edge` and still occupying it until the next edge
    /// admits the vehicle or, on the final edge, until it is retired.
    AtEdgeEnd { edge: EdgeId, finished_at: f64 },
    /// Reached the destination during minute `at`.
    Arrived { at: Tick },
    /// No route exists.
    Unroutable,
}

impl VehicleState {
    /// The edge the vehicle occupies, if any.
    #[inline]
    pub fn edge(&self) -> Option<EdgeId> {
        match *self {
            VehicleState::Traveling { edge, .. } | VehicleState::AtEdgeEnd { edge, .. } => Some(edge),
            _ => None,
        }
    }

    /// `true` for vehicles the advance phase must visit.
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            VehicleState::Waiting { .. }
                | VehicleState::Traveling { .. }
                | VehicleState::AtEdgeEnd { .. }
        )
    }
}

/// One vehicle: its demand record, its route once spawned, and its state.
#[derive(Clone, Debug)]
pub struct Vehicle {
    pub id:    VehicleId,
    pub trip:  Trip,
    /// Set at spawn.  `None` before spawn and for unroutable vehicles.
    pub route: Option<Trajectory>,
    /// Index into `route.edges` of the next edge to enter.
    pub next_leg: usize,
    pub state: VehicleState,
}

impl Vehicle {
    pub fn new(id: VehicleId, trip: Trip) -> Self {
        Self { id, trip, route: None, next_leg: 0, state: VehicleState::Unspawned }
    }

    /// The edge to enter next, `None` once the final edge has been entered.
    #[inline]
    pub fn next_edge(&self) -> Option<EdgeId> {
        self.route.as_ref().and_then(|r| r.edges.get(self.next_leg).copied())
    }

    pub fn arrival(&self) -> Option<Tick> {
        match self.state {
            VehicleState::Arrived { at } => Some(at),
            _ => None,
        }
    }

    /// Minutes from spawn to arrival.
    pub fn travel_minutes(&self) -> Option<u64> {
        self.arrival().map(|at| at.0.saturating_sub(self.trip.spawn.0))
    }
}
