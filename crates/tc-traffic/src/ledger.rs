//! Per-edge, per-minute occupancy and travel-time arrays.
//!
//! # Layout
//!
//! One `Vec` per edge for each quantity, every one pre-sized to the run's
//! horizon (`SimConfig::horizon()`), indexed by absolute minute.  All
//! operations are O(1) array accesses except [`EdgeLedger::carry_forward`],
//! which touches one slot per edge.
//!
//! # Horizon policy
//!
//! - Reads past the last slot return the last slot's value.
//! - Writes past the last slot are dropped.  The first dropped write logs a
//!   `warn!`; all of them are counted in [`EdgeLedger::dropped_writes`].
//!
//! # Occupancy convention
//!
//! In the live ledger, `occupancy[e][t]` is the number of vehicles located
//! on `e` at the end of minute `t`.  [`carry_forward`](EdgeLedger::carry_forward)
//! starts minute `t` from minute `t - 1`; entries call `increment` and
//! departures call `decrement`, so no vehicle is ever counted twice.
//!
//! A forecast ledger uses the same arrays differently: [`book`](EdgeLedger::book)
//! adds one unit for every minute a routed vehicle is projected to spend on
//! an edge, so later routes see earlier plans.

use log::warn;

use tc_core::{EdgeId, SimRng, Tick};
use tc_network::{EdgeCosts, RoadNetwork, Trajectory};

use crate::bpr::BprParams;
use crate::{TrafficError, TrafficResult};

// ── EdgeLedger ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct EdgeLedger {
    horizon:        usize,
    tt0:            Vec<f64>,
    /// Capacity after any per-edge multiplier.
    capacity:       Vec<u32>,
    occupancy:      Vec<Vec<u32>>,
    travel_time:    Vec<Vec<f64>>,
    dropped_writes: u64,
}

impl EdgeLedger {
    /// A ledger with zero occupancy and free-flow travel times everywhere.
    ///
    /// `horizon` is clamped to at least one slot.
    pub fn new(network: &RoadNetwork, horizon: usize) -> Self {
        let horizon = horizon.max(1);
        Self {
            horizon,
            tt0:            network.edge_tt0.clone(),
            capacity:       network.edge_capacity.clone(),
            occupancy:      vec![vec![0; horizon]; network.edge_count()],
            travel_time:    network.edge_tt0.iter().map(|&tt0| vec![tt0; horizon]).collect(),
            dropped_writes: 0,
        }
    }

    /// Set `edge`'s capacity to `floor(base_capacity * multiplier)`.
    pub fn scale_capacity(
        &mut self,
        network: &RoadNetwork,
        edge: EdgeId,
        multiplier: f64,
    ) -> TrafficResult<()> {
        let Some(&base) = network.edge_capacity.get(edge.index()) else {
            return Err(TrafficError::EdgeNotFound(edge));
        };
        if !(multiplier >= 0.0 && multiplier.is_finite()) {
            return Err(TrafficError::InvalidMultiplier { edge, multiplier });
        }
        self.capacity[edge.index()] = (base as f64 * multiplier).floor() as u32;
        Ok(())
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn edge_count(&self) -> usize {
        self.capacity.len()
    }

    #[inline]
    pub fn capacity(&self, edge: EdgeId) -> u32 {
        self.capacity[edge.index()]
    }

    #[inline]
    pub fn tt0(&self, edge: EdgeId) -> f64 {
        self.tt0[edge.index()]
    }

    /// Writes dropped because they fell past the horizon.
    pub fn dropped_writes(&self) -> u64 {
        self.dropped_writes
    }

    // ── Reads (clamped) ───────────────────────────────────────────────────

    #[inline]
    fn read_slot(&self, minute: Tick) -> usize {
        (minute.0 as usize).min(self.horizon - 1)
    }

    #[inline]
    pub fn occupancy(&self, edge: EdgeId, minute: Tick) -> u32 {
        self.occupancy[edge.index()][self.read_slot(minute)]
    }

    #[inline]
    pub fn travel_time(&self, edge: EdgeId, minute: Tick) -> f64 {
        self.travel_time[edge.index()][self.read_slot(minute)]
    }

    /// Full occupancy timeline of one edge.
    pub fn occupancy_series(&self, edge: EdgeId) -> &[u32] {
        &self.occupancy[edge.index()]
    }

    pub fn travel_time_series(&self, edge: EdgeId) -> &[f64] {
        &self.travel_time[edge.index()]
    }

    // ── Writes (dropped past the horizon) ─────────────────────────────────

    fn write_slot(&mut self, minute: Tick) -> Option<usize> {
        let slot = minute.0 as usize;
        if slot < self.horizon {
            return Some(slot);
        }
        if self.dropped_writes == 0 {
            warn!(
                "ledger write at {minute} is past the horizon of {} minutes; dropping",
                self.horizon
            );
        }
        self.dropped_writes += 1;
        None
    }

    pub fn increment(&mut self, edge: EdgeId, minute: Tick) {
        if let Some(slot) = self.write_slot(minute) {
            self.occupancy[edge.index()][slot] += 1;
        }
    }

    /// Saturates at zero.
    pub fn decrement(&mut self, edge: EdgeId, minute: Tick) {
        if let Some(slot) = self.write_slot(minute) {
            let occ = &mut self.occupancy[edge.index()][slot];
            *occ = occ.saturating_sub(1);
        }
    }

    pub fn write_travel_time(&mut self, edge: EdgeId, minute: Tick, value: f64) {
        if let Some(slot) = self.write_slot(minute) {
            self.travel_time[edge.index()][slot] = value.max(0.0);
        }
    }

    /// Recompute `travel_time[edge][minute]` from the occupancy at `minute`.
    pub fn refresh(&mut self, edge: EdgeId, minute: Tick, params: &BprParams, rng: &mut SimRng) {
        let tt = params.travel_time(
            self.tt0(edge),
            self.occupancy(edge, minute),
            self.capacity(edge),
            rng,
        );
        self.write_travel_time(edge, minute, tt);
    }

    /// Start `minute` from the state at the end of `minute - 1`.
    ///
    /// No-op at minute 0 and past the horizon.
    pub fn carry_forward(&mut self, minute: Tick) {
        let t = minute.0 as usize;
        if t == 0 || t >= self.horizon {
            return;
        }
        for occ in &mut self.occupancy {
            occ[t] = occ[t - 1];
        }
        for tt in &mut self.travel_time {
            tt[t] = tt[t - 1];
        }
    }

    /// Book a routed trajectory: for every edge and every whole minute
    /// `round(entry) .. floor(exit)` the vehicle is projected to spend on it,
    /// add one vehicle and refresh that minute's travel time.
    pub fn book(&mut self, trajectory: &Trajectory, params: &BprParams, rng: &mut SimRng) {
        for (edge, entry, exit) in trajectory.legs() {
            let first = Tick::round_from(entry).0;
            let last  = Tick::floor_from(exit).0;
            for m in first..last {
                let minute = Tick(m);
                if m as usize >= self.horizon {
                    // Counted once per leg, not per minute.
                    let _ = self.write_slot(minute);
                    break;
                }
                self.increment(edge, minute);
                self.refresh(edge, minute, params, rng);
            }
        }
    }

    /// Borrow as routing costs.  With `clamp_to = Some(t)` every lookup
    /// after `t` reads minute `t` instead.
    pub fn view(&self, clamp_to: Option<Tick>) -> LedgerView<'_> {
        LedgerView { ledger: self, clamp_to }
    }
}

// ── LedgerView ────────────────────────────────────────────────────────────────

/// Read-only [`EdgeCosts`] adapter over an [`EdgeLedger`].
#[derive(Copy, Clone)]
pub struct LedgerView<'a> {
    pub ledger:   &'a EdgeLedger,
    pub clamp_to: Option<Tick>,
}

impl LedgerView<'_> {
    #[inline]
    fn minute(&self, minute: Tick) -> Tick {
        match self.clamp_to {
            Some(limit) => minute.min(limit),
            None        => minute,
        }
    }
}

impl EdgeCosts for LedgerView<'_> {
    fn travel_time(&self, edge: EdgeId, minute: Tick) -> f64 {
        self.ledger.travel_time(edge, self.minute(minute))
    }

    fn occupancy(&self, edge: EdgeId, minute: Tick) -> u32 {
        self.ledger.occupancy(edge, self.minute(minute))
    }

    fn capacity(&self, edge: EdgeId) -> u32 {
        self.ledger.capacity(edge)
    }
}
