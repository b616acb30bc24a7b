//! Results of one run: per-vehicle outcomes and per-edge congestion history.

use tc_core::{EdgeId, NodeId, Tick, VehicleId};
use tc_traffic::{EdgeLedger, Vehicle, VehicleState};

// ── CongestionHistory ─────────────────────────────────────────────────────────

/// Occupancy / capacity ratio of every edge, one sample per minute recorded.
///
/// `series(e)[i]` belongs to minute `first + i`.  A zero capacity counts as 1.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CongestionHistory {
    first:  Option<Tick>,
    ratios: Vec<Vec<f64>>,
}

impl CongestionHistory {
    pub fn new(edge_count: usize) -> Self {
        Self { first: None, ratios: vec![Vec::new(); edge_count] }
    }

    /// Append every edge's ratio at `minute`.
    ///
    /// Minutes must be recorded consecutively.
    pub fn record(&mut self, minute: Tick, ledger: &EdgeLedger) {
        self.first.get_or_insert(minute);
        for (e, series) in self.ratios.iter_mut().enumerate() {
            let edge = EdgeId(e as u32);
            let cap = ledger.capacity(edge).max(1) as f64;
            series.push(ledger.occupancy(edge, minute) as f64 / cap);
        }
    }

    /// First recorded minute, `None` before anything was recorded.
    pub fn first_minute(&self) -> Option<Tick> {
        self.first
    }

    /// Number of recorded minutes.
    pub fn len(&self) -> usize {
        self.ratios.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.ratios.len()
    }

    pub fn series(&self, edge: EdgeId) -> &[f64] {
        &self.ratios[edge.index()]
    }

    /// Mean ratio of `edge` over the recorded minutes.
    pub fn average(&self, edge: EdgeId) -> Option<f64> {
        let s = self.ratios.get(edge.index())?;
        if s.is_empty() {
            return None;
        }
        Some(s.iter().sum::<f64>() / s.len() as f64)
    }

    pub fn peak(&self, edge: EdgeId) -> Option<f64> {
        self.ratios.get(edge.index())?.iter().copied().reduce(f64::max)
    }

    /// Edge with the highest mean ratio; the lowest id wins ties.
    pub fn most_congested(&self) -> Option<(EdgeId, f64)> {
        let mut best: Option<(EdgeId, f64)> = None;
        for e in 0..self.ratios.len() {
            let edge = EdgeId(e as u32);
            let Some(avg) = self.average(edge) else { continue };
            if best.is_none_or(|(_, b)| avg > b) {
                best = Some((edge, avg));
            }
        }
        best
    }
}

// ── VehicleRecord ─────────────────────────────────────────────────────────────

/// Final outcome of one vehicle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleRecord {
    pub id:          VehicleId,
    pub origin:      NodeId,
    pub destination: NodeId,
    pub spawn:       Tick,
    /// `None` if the vehicle never reached its destination.
    pub arrival:     Option<Tick>,
    pub unroutable:  bool,
    /// Planned node sequence; empty when no route was assigned.
    pub path:        Vec<NodeId>,
    /// Travel time the router projected at spawn, in minutes.
    pub planned:     Option<f64>,
}

impl VehicleRecord {
    pub fn from_vehicle(v: &Vehicle) -> Self {
        Self {
            id:          v.id,
            origin:      v.trip.origin,
            destination: v.trip.destination,
            spawn:       v.trip.spawn,
            arrival:     v.arrival(),
            unroutable:  v.state == VehicleState::Unroutable,
            path:        v.route.as_ref().map(|r| r.node_ids().collect()).unwrap_or_default(),
            planned:     v.route.as_ref().map(|r| r.travel_time),
        }
    }

    /// Minutes from spawn to arrival.
    pub fn travel_minutes(&self) -> Option<u64> {
        self.arrival.map(|at| at.since(self.spawn))
    }
}

// ── RunReport ─────────────────────────────────────────────────────────────────

/// Everything a run leaves behind for downstream analysis.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunReport {
    /// Statistics cover minutes at or after this one.
    pub warmup:         Tick,
    /// First minute not simulated.
    pub final_tick:     Tick,
    pub vehicles:       Vec<VehicleRecord>,
    pub congestion:     CongestionHistory,
    /// Ledger writes dropped past the horizon.
    pub dropped_writes: u64,
}

impl RunReport {
    /// `arrival - spawn` of every arrived vehicle spawned at or after warm-up,
    /// in vehicle order.
    pub fn travel_times(&self) -> Vec<u64> {
        self.vehicles
            .iter()
            .filter(|v| v.spawn >= self.warmup)
            .filter_map(VehicleRecord::travel_minutes)
            .collect()
    }

    pub fn mean_travel_time(&self) -> Option<f64> {
        let tt = self.travel_times();
        if tt.is_empty() {
            return None;
        }
        Some(tt.iter().sum::<u64>() as f64 / tt.len() as f64)
    }

    pub fn arrived_count(&self) -> usize {
        self.vehicles.iter().filter(|v| v.arrival.is_some()).count()
    }

    pub fn unroutable_count(&self) -> usize {
        self.vehicles.iter().filter(|v| v.unroutable).count()
    }

    pub fn most_congested(&self) -> Option<(EdgeId, f64)> {
        self.congestion.most_congested()
    }
}
