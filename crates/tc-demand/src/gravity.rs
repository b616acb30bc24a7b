//! Population-weighted origin/destination demand.
//!
//! # Model
//!
//! For every ordered pair `(o, d)` of distinct nodes that both carry a
//! population:
//!
//! ```text
//! f(o, d) = P_o / P_total  *  P_d / (P_total - P_o)
//! ```
//!
//! `P_total` sums every populated node.  Summed over all pairs the fractions
//! equal 1 whenever at least two nodes carry a positive population.
//!
//! Each minute `m` and pair `(o, d)` then spawns
//! `max(0, round(Normal(total_per_minute * f(o, d), std_dev)))` trips.
//! Trips come out ordered by minute, then by pair in matrix order.

use log::info;
use rand_distr::{Distribution, Normal};

use tc_core::{NodeId, SimRng, Tick, Trip};
use tc_network::RoadNetwork;

use crate::{DemandError, DemandResult};

// ── DemandConfig ──────────────────────────────────────────────────────────────

/// How many trips to sample and over how long.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DemandConfig {
    /// Expected trips per minute over the whole network.
    pub total_per_minute: f64,
    /// Standard deviation of each pair's per-minute count.
    pub std_dev:          f64,
    /// Minutes `0 .. minutes` receive trips.
    pub minutes:          u64,
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self { total_per_minute: 85.0, std_dev: 1.5, minutes: 240 }
    }
}

impl DemandConfig {
    pub fn validate(&self) -> DemandResult<()> {
        if !(self.total_per_minute >= 0.0 && self.total_per_minute.is_finite()) {
            return Err(DemandError::InvalidConfig(format!(
                "total_per_minute = {}",
                self.total_per_minute
            )));
        }
        if !(self.std_dev >= 0.0 && self.std_dev.is_finite()) {
            return Err(DemandError::InvalidConfig(format!("std_dev = {}", self.std_dev)));
        }
        Ok(())
    }
}

// ── TravelMatrix ──────────────────────────────────────────────────────────────

/// Share of the total demand travelling from `origin` to `destination`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OdPair {
    pub origin:      NodeId,
    pub destination: NodeId,
    pub fraction:    f64,
}

/// Ordered list of origin/destination pairs with their demand fractions.
#[derive(Clone, Debug, Default)]
pub struct TravelMatrix {
    pairs: Vec<OdPair>,
}

impl TravelMatrix {
    /// Gravity matrix over every populated node of `network`, in node order.
    pub fn from_network(network: &RoadNetwork) -> Self {
        let populated: Vec<(NodeId, f64)> = network
            .node_population
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|p| (NodeId(i as u32), p as f64)))
            .collect();
        let total: f64 = populated.iter().map(|&(_, p)| p).sum();

        let mut pairs = Vec::new();
        for &(o, p_o) in &populated {
            let rest = total - p_o;
            for &(d, p_d) in &populated {
                if o == d {
                    continue;
                }
                let fraction = if rest > 0.0 { (p_o / total) * (p_d / rest) } else { 0.0 };
                pairs.push(OdPair { origin: o, destination: d, fraction });
            }
        }
        Self { pairs }
    }

    /// All demand between one origin and one destination.
    pub fn single(origin: NodeId, destination: NodeId) -> Self {
        Self { pairs: vec![OdPair { origin, destination, fraction: 1.0 }] }
    }

    pub fn pairs(&self) -> &[OdPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn fraction(&self, origin: NodeId, destination: NodeId) -> Option<f64> {
        self.pairs
            .iter()
            .find(|p| p.origin == origin && p.destination == destination)
            .map(|p| p.fraction)
    }

    /// Sum of all fractions.
    pub fn total_fraction(&self) -> f64 {
        self.pairs.iter().map(|p| p.fraction).sum()
    }
}

// ── Sampling ──────────────────────────────────────────────────────────────────

/// Per-minute trip counts for every pair: `counts[pair][minute]`.
///
/// Draws are taken pair by pair, minute by minute.  No draw is taken when
/// `std_dev` is 0.
pub fn sample_counts(
    matrix: &TravelMatrix,
    config: &DemandConfig,
    rng:    &mut SimRng,
) -> DemandResult<Vec<Vec<u32>>> {
    config.validate()?;
    let counts = matrix
        .pairs
        .iter()
        .map(|pair| {
            let mean = config.total_per_minute * pair.fraction;
            let normal = Normal::new(mean, config.std_dev).ok().filter(|_| config.std_dev > 0.0);
            (0..config.minutes)
                .map(|_| {
                    let x = match &normal {
                        Some(d) => d.sample(rng.inner()),
                        None    => mean,
                    };
                    x.round().max(0.0) as u32
                })
                .collect()
        })
        .collect();
    Ok(counts)
}

/// Sample the trips of a whole run, ordered by spawn minute then by pair.
///
/// # Errors
/// [`DemandError::InvalidConfig`] for negative or non-finite config values.
pub fn sample_trips(
    matrix: &TravelMatrix,
    config: &DemandConfig,
    rng:    &mut SimRng,
) -> DemandResult<Vec<Trip>> {
    let counts = sample_counts(matrix, config, rng)?;
    let total: u64 = counts.iter().flatten().map(|&n| n as u64).sum();

    let mut trips = Vec::with_capacity(total as usize);
    for minute in 0..config.minutes {
        for (pair, series) in matrix.pairs.iter().zip(&counts) {
            let trip = Trip::new(pair.origin, pair.destination, Tick(minute));
            let n = series[minute as usize] as usize;
            trips.extend(std::iter::repeat_n(trip, n));
        }
    }

    info!(
        "sampled {} trips over {} pairs and {} minutes",
        trips.len(),
        matrix.len(),
        config.minutes
    );
    Ok(trips)
}
