//! Plain data row types written by output backends.

use tc_core::{EdgeId, Tick};
use tc_network::RoadNetwork;
use tc_sim::{Comparison, RunReport, TickSummary, VehicleRecord};
use tc_traffic::EdgeLedger;

/// Load of one edge at a given minute.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLoadRow {
    pub tick:        u64,
    pub edge:        u32,
    pub from:        String,
    pub to:          String,
    pub occupancy:   u32,
    /// Effective capacity, after any multiplier.
    pub capacity:    u32,
    pub travel_time: f64,
}

impl EdgeLoadRow {
    /// One row per edge, in edge order.
    pub fn snapshot(tick: Tick, network: &RoadNetwork, ledger: &EdgeLedger) -> Vec<Self> {
        (0..network.edge_count())
            .map(|e| {
                let edge = EdgeId(e as u32);
                Self {
                    tick:        tick.0,
                    edge:        edge.0,
                    from:        network.node_name(network.edge_from[e]).to_owned(),
                    to:          network.node_name(network.edge_to[e]).to_owned(),
                    occupancy:   ledger.occupancy(edge, tick),
                    capacity:    ledger.capacity(edge),
                    travel_time: ledger.travel_time(edge, tick),
                }
            })
            .collect()
    }

    /// One row per minute of the ledger horizon for a single edge.
    pub fn timeline(edge: EdgeId, network: &RoadNetwork, ledger: &EdgeLedger) -> Vec<Self> {
        let from = network.node_name(network.edge_from[edge.index()]);
        let to = network.node_name(network.edge_to[edge.index()]);
        let capacity = ledger.capacity(edge);
        ledger
            .occupancy_series(edge)
            .iter()
            .zip(ledger.travel_time_series(edge))
            .enumerate()
            .map(|(minute, (&occupancy, &travel_time))| Self {
                tick:        minute as u64,
                edge:        edge.0,
                from:        from.to_owned(),
                to:          to.to_owned(),
                occupancy,
                capacity,
                travel_time,
            })
            .collect()
    }
}

/// Summary statistics for one simulated minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:       u64,
    pub spawned:    u64,
    pub arrived:    u64,
    pub active:     u64,
    pub unroutable: u64,
}

impl From<&TickSummary> for TickSummaryRow {
    fn from(s: &TickSummary) -> Self {
        Self {
            tick:       s.tick.0,
            spawned:    s.spawned as u64,
            arrived:    s.arrived as u64,
            active:     s.active as u64,
            unroutable: s.unroutable as u64,
        }
    }
}

/// Final outcome of one vehicle, with node names resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRow {
    pub vehicle:     u32,
    pub origin:      String,
    pub destination: String,
    pub spawn:       u64,
    /// Empty when the vehicle never arrived.
    pub arrival:     Option<u64>,
    pub travel_time: Option<u64>,
    /// Node names joined with `" > "`; empty for unroutable vehicles.
    pub path:        String,
}

impl TripRow {
    pub fn from_record(v: &VehicleRecord, network: &RoadNetwork) -> Self {
        Self {
            vehicle:     v.id.0,
            origin:      network.node_name(v.origin).to_owned(),
            destination: network.node_name(v.destination).to_owned(),
            spawn:       v.spawn.0,
            arrival:     v.arrival.map(|t| t.0),
            travel_time: v.travel_minutes(),
            path:        v
                .path
                .iter()
                .map(|&n| network.node_name(n))
                .collect::<Vec<_>>()
                .join(" > "),
        }
    }
}

/// One line of a capacity comparison: the varied edge under one multiplier.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub multiplier:       f64,
    pub edge:             u32,
    pub from:             String,
    pub to:               String,
    /// `floor(base capacity * multiplier)`.
    pub capacity:         u32,
    pub mean_ratio:       Option<f64>,
    pub peak_ratio:       Option<f64>,
    /// Mean travel time of vehicles spawned after warm-up.
    pub mean_travel_time: Option<f64>,
    pub arrived:          u64,
    pub unroutable:       u64,
}

impl ComparisonRow {
    /// Baseline first (multiplier 1), then variants in their given order.
    pub fn from_comparison(cmp: &Comparison, network: &RoadNetwork) -> Vec<Self> {
        std::iter::once((1.0, &cmp.baseline))
            .chain(cmp.variants.iter().map(|v| (v.multiplier, &v.report)))
            .map(|(multiplier, report)| Self::from_report(cmp.edge, multiplier, report, network))
            .collect()
    }

    fn from_report(edge: EdgeId, multiplier: f64, report: &RunReport, network: &RoadNetwork) -> Self {
        let e = edge.index();
        Self {
            multiplier,
            edge:             edge.0,
            from:             network.node_name(network.edge_from[e]).to_owned(),
            to:               network.node_name(network.edge_to[e]).to_owned(),
            capacity:         (network.edge_capacity[e] as f64 * multiplier).floor() as u32,
            mean_ratio:       report.congestion.average(edge),
            peak_ratio:       report.congestion.peak(edge),
            mean_travel_time: report.mean_travel_time(),
            arrived:          report.arrived_count() as u64,
            unroutable:       report.unroutable_count() as u64,
        }
    }
}
