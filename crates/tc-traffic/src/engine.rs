//! Per-minute traffic engine: retire, spawn, advance, refresh.

use log::debug;

use tc_core::{EdgeId, SimRng, Tick, Trip, VehicleId};
use tc_network::{RoadNetwork, Router, Trajectory};

use crate::bpr::BprParams;
use crate::fleet::Fleet;
use crate::ledger::EdgeLedger;
use crate::state::{Vehicle, VehicleState};
use crate::{TrafficError, TrafficResult};

/// Tolerance in minutes for the edge-finished test.
pub const FINISH_EPSILON: f64 = 1e-6;

/// Which congestion picture the router sees when a vehicle spawns.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RoutingSource {
    /// The live ledger, every lookup clamped to the spawn minute.  Routes
    /// computed in the same minute are independent of each other.
    Snapshot,
    /// A forecast ledger read at projected minutes.  Each routed trajectory
    /// is booked into the forecast before the next vehicle is routed, so
    /// vehicles spawning together spread over parallel routes.
    #[default]
    Forecast,
}

/// What the spawn phase did in one minute.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SpawnOutcome {
    /// Vehicles that received a route (including trivial ones).
    pub routed:     usize,
    /// Trivial trips that arrived on the spot.
    pub arrived:    usize,
    pub unroutable: usize,
}

/// Counts from one full minute.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StepCounts {
    pub spawned:    usize,
    pub arrived:    usize,
    pub unroutable: usize,
    /// Edge entries made during the advance phase.
    pub entered:    usize,
}

/// Owns the fleet, the live ledger, and (in forecast mode) the forecast
/// ledger, and drives the vehicle state machine one minute at a time.
///
/// # Type parameter
///
/// `R` must implement [`Router`] (e.g. [`tc_network::AStarRouter`]).  Swap it
/// at compile time for a different routing algorithm with no runtime
/// overhead.
pub struct TrafficEngine<R: Router> {
    pub router:   R,
    pub fleet:    Fleet,
    /// Where vehicles actually are.
    pub live:     EdgeLedger,
    /// Planned occupancy; `Some` only with [`RoutingSource::Forecast`].
    pub forecast: Option<EdgeLedger>,
    pub params:   BprParams,
    live_rng:     SimRng,
    forecast_rng: SimRng,
}

impl<R: Router> TrafficEngine<R> {
    /// Build an engine for `trips` over `network`.
    ///
    /// `rng` is the run's root RNG; the live and forecast noise streams are
    /// derived from it as children 1 and 2.
    ///
    /// # Errors
    /// - [`TrafficError::InvalidParams`] for negative or non-finite BPR
    ///   parameters.
    /// - [`TrafficError::UnknownNode`] if a trip names a node outside the
    ///   network.
    pub fn new(
        router:  R,
        network: &RoadNetwork,
        trips:   &[Trip],
        horizon: usize,
        params:  BprParams,
        source:  RoutingSource,
        rng:     &mut SimRng,
    ) -> TrafficResult<Self> {
        params.validate()?;
        for (i, trip) in trips.iter().enumerate() {
            for node in [trip.origin, trip.destination] {
                if node.index() >= network.node_count() {
                    return Err(TrafficError::UnknownNode { vehicle: VehicleId(i as u32), node });
                }
            }
        }

        let live = EdgeLedger::new(network, horizon);
        let forecast = match source {
            RoutingSource::Snapshot => None,
            RoutingSource::Forecast => Some(live.clone()),
        };

        Ok(Self {
            router,
            fleet: Fleet::from_trips(trips),
            live,
            forecast,
            params,
            live_rng:     rng.child(1),
            forecast_rng: rng.child(2),
        })
    }

    pub fn source(&self) -> RoutingSource {
        if self.forecast.is_some() { RoutingSource::Forecast } else { RoutingSource::Snapshot }
    }

    /// Scale one edge's capacity in every ledger.
    pub fn scale_capacity(&mut self, network: &RoadNetwork, edge: EdgeId, multiplier: f64) -> TrafficResult<()> {
        self.live.scale_capacity(network, edge, multiplier)?;
        if let Some(forecast) = self.forecast.as_mut() {
            forecast.scale_capacity(network, edge, multiplier)?;
        }
        Ok(())
    }

    /// Run every phase of minute `now` in order.
    pub fn step(&mut self, network: &RoadNetwork, now: Tick) -> StepCounts {
        self.begin_minute(now);
        let retired = self.retire(now);
        let spawn   = self.spawn(network, now);
        let entered = self.advance(now);
        self.refresh(now);
        StepCounts {
            spawned:    spawn.routed,
            arrived:    retired + spawn.arrived,
            unroutable: spawn.unroutable,
            entered,
        }
    }

    // ── Phases ────────────────────────────────────────────────────────────

    /// Start minute `now` from the end state of `now - 1`.
    pub fn begin_minute(&mut self, now: Tick) {
        self.live.carry_forward(now);
    }

    /// Vehicles waiting at the end of their final edge leave the network.
    pub fn retire(&mut self, now: Tick) -> usize {
        let mut retired = 0;
        for i in 0..self.fleet.active_ids().len() {
            let id = self.fleet.active_ids()[i];
            let v = self.fleet.get_mut(id);
            if let VehicleState::AtEdgeEnd { edge, .. } = v.state {
                if v.next_edge().is_none() {
                    self.live.decrement(edge, now);
                    v.state = VehicleState::Arrived { at: now };
                    debug!("{id} arrived at {now}");
                    retired += 1;
                }
            }
        }
        if retired > 0 {
            self.fleet.compact();
        }
        retired
    }

    /// Route every vehicle whose spawn minute has come.
    pub fn spawn(&mut self, network: &RoadNetwork, now: Tick) -> SpawnOutcome {
        let due = self.fleet.take_due(now);
        let mut out = SpawnOutcome::default();
        if due.is_empty() {
            return out;
        }

        let routes: Vec<Option<Trajectory>> = match self.forecast.as_mut() {
            None => route_snapshot(&self.router, &self.fleet, &self.live, network, now, &due),
            Some(forecast) => {
                let mut routes = Vec::with_capacity(due.len());
                for &id in &due {
                    let trip = self.fleet.get(id).trip;
                    let route = self.router.route(
                        network,
                        &forecast.view(None),
                        trip.origin,
                        trip.destination,
                        now,
                    );
                    if let Some(t) = &route {
                        forecast.book(t, &self.params, &mut self.forecast_rng);
                    }
                    routes.push(route);
                }
                routes
            }
        };

        let mut activated = Vec::with_capacity(due.len());
        for (id, route) in due.into_iter().zip(routes) {
            let v = self.fleet.get_mut(id);
            match route {
                None => {
                    debug!(
                        "{id}: no route from {} to {}",
                        network.node_name(v.trip.origin),
                        network.node_name(v.trip.destination),
                    );
                    v.state = VehicleState::Unroutable;
                    out.unroutable += 1;
                }
                Some(t) if t.is_trivial() => {
                    v.route = Some(t);
                    v.state = VehicleState::Arrived { at: now };
                    out.routed += 1;
                    out.arrived += 1;
                }
                Some(t) => {
                    v.route = Some(t);
                    v.next_leg = 0;
                    v.state = VehicleState::Waiting { node: v.trip.origin };
                    activated.push(id);
                    out.routed += 1;
                }
            }
        }
        self.fleet.activate(activated);
        out
    }

    /// Move every active vehicle as far as minute `now` allows, in ascending
    /// id order with immediate effect on the live ledger.
    ///
    /// Returns the number of edge entries.
    pub fn advance(&mut self, now: Tick) -> usize {
        let mut entered = 0;
        for i in 0..self.fleet.active_ids().len() {
            let id = self.fleet.active_ids()[i];
            entered += advance_vehicle(self.fleet.get_mut(id), &mut self.live, now);
        }
        entered
    }

    /// Recompute every edge's travel time for minute `now`, in edge order.
    pub fn refresh(&mut self, now: Tick) {
        for e in 0..self.live.edge_count() {
            self.live.refresh(EdgeId(e as u32), now, &self.params, &mut self.live_rng);
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn route_snapshot<R: Router>(
    router:  &R,
    fleet:   &Fleet,
    live:    &EdgeLedger,
    network: &RoadNetwork,
    now:     Tick,
    due:     &[VehicleId],
) -> Vec<Option<Trajectory>> {
    let view = live.view(Some(now));
    let route_one = |id: &VehicleId| {
        let trip = fleet.get(*id).trip;
        router.route(network, &view, trip.origin, trip.destination, now)
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        due.par_iter().map(route_one).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        due.iter().map(route_one).collect()
    }
}

#[inline]
fn has_room(live: &EdgeLedger, edge: EdgeId, now: Tick) -> bool {
    live.occupancy(edge, now) < live.capacity(edge)
}

/// Apply as many transitions as minute `now` allows to one vehicle.
///
/// A vehicle admitted to its next edge in the minute it finished the previous
/// one enters at the exact finish time, so a chain of short edges can be
/// crossed within one minute.
fn advance_vehicle(v: &mut Vehicle, live: &mut EdgeLedger, now: Tick) -> usize {
    let minute_end = now.as_minutes() + 1.0;
    let mut entered = 0;
    loop {
        match v.state {
            VehicleState::Waiting { .. } => {
                let Some(next) = v.next_edge() else { break };
                if !has_room(live, next, now) {
                    break;
                }
                live.increment(next, now);
                v.state = VehicleState::Traveling { edge: next, entered_at: now.as_minutes() };
                v.next_leg += 1;
                entered += 1;
            }
            VehicleState::Traveling { edge, entered_at } => {
                let finish = entered_at + live.travel_time(edge, now);
                if finish > minute_end + FINISH_EPSILON {
                    break;
                }
                v.state = VehicleState::AtEdgeEnd { edge, finished_at: finish };
            }
            VehicleState::AtEdgeEnd { edge, finished_at } => {
                let Some(next) = v.next_edge() else { break };
                if !has_room(live, next, now) {
                    break;
                }
                live.decrement(edge, now);
                live.increment(next, now);
                v.state = VehicleState::Traveling {
                    edge:       next,
                    entered_at: finished_at.max(now.as_minutes()),
                };
                v.next_leg += 1;
                entered += 1;
            }
            VehicleState::Unspawned | VehicleState::Arrived { .. } | VehicleState::Unroutable => break,
        }
    }
    entered
}
