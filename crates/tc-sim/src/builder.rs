//! Fluent builder for constructing a [`Sim`].

use log::info;

use tc_core::{EdgeId, SimConfig, SimRng, Trip};
use tc_network::{AStarRouter, RoadNetwork, Router};
use tc_traffic::{BprParams, RoutingSource, TrafficEngine};

use crate::report::CongestionHistory;
use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim<R>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: total minutes, warm-up, horizon margin, seed
/// - [`RoadNetwork`]: from [`tc_network::RoadNetworkBuilder`]
/// - `Vec<Trip>`: the demand, e.g. from `tc_demand::sample_trips`
///
/// # Optional inputs (have defaults)
///
/// | Method                          | Default                         |
/// |---------------------------------|---------------------------------|
/// | `.router(r)`                    | `AStarRouter::default()`        |
/// | `.bpr(p)`                       | `BprParams::default()`          |
/// | `.routing_source(s)`            | `RoutingSource::Forecast`       |
/// | `.capacity_multiplier(e, m)`    | every edge at its base capacity |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, network, trips)
///     .bpr(BprParams::deterministic())
///     .capacity_multiplier(bottleneck, 2.0)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// let report = sim.report();
/// ```
pub struct SimBuilder<R: Router = AStarRouter> {
    config:   SimConfig,
    network:  RoadNetwork,
    trips:    Vec<Trip>,
    router:   R,
    bpr:      BprParams,
    source:   RoutingSource,
    capacity: Vec<(EdgeId, f64)>,
}

impl SimBuilder<AStarRouter> {
    /// Create a builder with all required inputs and the default router.
    pub fn new(config: SimConfig, network: RoadNetwork, trips: Vec<Trip>) -> Self {
        Self {
            config,
            network,
            trips,
            router:   AStarRouter::default(),
            bpr:      BprParams::default(),
            source:   RoutingSource::default(),
            capacity: Vec::new(),
        }
    }
}

impl<R: Router> SimBuilder<R> {
    /// Swap in a different routing algorithm.
    pub fn router<R2: Router>(self, router: R2) -> SimBuilder<R2> {
        SimBuilder {
            config:   self.config,
            network:  self.network,
            trips:    self.trips,
            router,
            bpr:      self.bpr,
            source:   self.source,
            capacity: self.capacity,
        }
    }

    pub fn bpr(mut self, params: BprParams) -> Self {
        self.bpr = params;
        self
    }

    pub fn routing_source(mut self, source: RoutingSource) -> Self {
        self.source = source;
        self
    }

    /// Scale `edge`'s capacity to `floor(base * multiplier)` for this run.
    pub fn capacity_multiplier(mut self, edge: EdgeId, multiplier: f64) -> Self {
        self.capacity.push((edge, multiplier));
        self
    }

    /// Validate inputs, build the traffic engine, and return a ready-to-run
    /// [`Sim`].
    ///
    /// # Errors
    /// - [`SimError::Core`] if the warm-up is longer than the run or the
    ///   thread count is zero.
    /// - [`SimError::DuplicateOverride`] if one edge got two multipliers.
    /// - [`SimError::Traffic`] for bad BPR parameters, trips naming unknown
    ///   nodes, or invalid capacity multipliers.
    pub fn build(self) -> SimResult<Sim<R>> {
        self.config.validate()?;
        for (i, &(edge, _)) in self.capacity.iter().enumerate() {
            if self.capacity[..i].iter().any(|&(e, _)| e == edge) {
                return Err(SimError::DuplicateOverride(edge));
            }
        }

        let mut rng = SimRng::new(self.config.seed);
        let mut engine = TrafficEngine::new(
            self.router,
            &self.network,
            &self.trips,
            self.config.horizon(),
            self.bpr,
            self.source,
            &mut rng,
        )?;
        for &(edge, multiplier) in &self.capacity {
            engine.scale_capacity(&self.network, edge, multiplier)?;
            info!(
                "capacity of {} scaled by {multiplier}: {}",
                self.network.edge_label(edge),
                engine.live.capacity(edge)
            );
        }

        Ok(Sim {
            clock:   self.config.make_clock(),
            history: CongestionHistory::new(self.network.edge_count()),
            config:  self.config,
            network: self.network,
            engine,
        })
    }
}
