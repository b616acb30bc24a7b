//! Comparative capacity runs: "what if this road were wider?"
//!
//! A [`Scenario`] holds the inputs of a run by value.  Every run builds its
//! own [`Sim`][crate::Sim] from clones of those inputs and a fresh RNG seeded
//! from `config.seed`, so runs share nothing and differ only in the capacity
//! overrides they are given.  With the `parallel` feature the variant runs of
//! [`Scenario::compare_capacity`] execute on Rayon.

use log::info;

use tc_core::{EdgeId, SimConfig, Trip};
use tc_network::{AStarRouter, RoadNetwork, Router};
use tc_traffic::{BprParams, RoutingSource};

use crate::report::RunReport;
use crate::{NoopObserver, SimBuilder, SimError, SimResult};

// ── Results ───────────────────────────────────────────────────────────────────

/// One re-run with `edge`'s capacity multiplied by `multiplier`.
#[derive(Clone, Debug)]
pub struct VariantRun {
    pub multiplier: f64,
    pub report:     RunReport,
}

impl VariantRun {
    /// Mean post-warm-up congestion ratio of `edge` in this run.
    pub fn average_ratio(&self, edge: EdgeId) -> Option<f64> {
        self.report.congestion.average(edge)
    }
}

/// A baseline run and one re-run per capacity multiplier of `edge`.
#[derive(Clone, Debug)]
pub struct Comparison {
    /// The edge whose capacity was varied.
    pub edge:     EdgeId,
    pub baseline: RunReport,
    /// In the order the multipliers were given.
    pub variants: Vec<VariantRun>,
}

impl Comparison {
    /// `(multiplier, mean congestion ratio of the varied edge)` for the
    /// baseline (multiplier 1) followed by every variant.
    pub fn edge_ratios(&self) -> Vec<(f64, Option<f64>)> {
        std::iter::once((1.0, self.baseline.congestion.average(self.edge)))
            .chain(self.variants.iter().map(|v| (v.multiplier, v.average_ratio(self.edge))))
            .collect()
    }

    /// `(multiplier, mean post-warm-up travel time)` for the baseline and
    /// every variant.
    pub fn mean_travel_times(&self) -> Vec<(f64, Option<f64>)> {
        std::iter::once((1.0, self.baseline.mean_travel_time()))
            .chain(self.variants.iter().map(|v| (v.multiplier, v.report.mean_travel_time())))
            .collect()
    }
}

// ── Scenario ──────────────────────────────────────────────────────────────────

/// Inputs shared by every run of a comparison.
#[derive(Clone, Debug)]
pub struct Scenario<R: Router + Clone = AStarRouter> {
    pub config:  SimConfig,
    pub network: RoadNetwork,
    pub trips:   Vec<Trip>,
    pub router:  R,
    pub bpr:     BprParams,
    pub source:  RoutingSource,
}

impl Scenario<AStarRouter> {
    pub fn new(config: SimConfig, network: RoadNetwork, trips: Vec<Trip>) -> Self {
        Self {
            config,
            network,
            trips,
            router: AStarRouter::default(),
            bpr:    BprParams::default(),
            source: RoutingSource::default(),
        }
    }
}

impl<R: Router + Clone> Scenario<R> {
    pub fn with_router<R2: Router + Clone>(self, router: R2) -> Scenario<R2> {
        Scenario {
            config:  self.config,
            network: self.network,
            trips:   self.trips,
            router,
            bpr:     self.bpr,
            source:  self.source,
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

    /// Run once from fresh copies of the inputs with the given overrides.
    pub fn run(&self, overrides: &[(EdgeId, f64)]) -> SimResult<RunReport> {
        let mut builder = SimBuilder::new(self.config.clone(), self.network.clone(), self.trips.clone())
            .router(self.router.clone())
            .bpr(self.bpr)
            .routing_source(self.source);
        for &(edge, multiplier) in overrides {
            builder = builder.capacity_multiplier(edge, multiplier);
        }
        let mut sim = builder.build()?;
        sim.run(&mut NoopObserver)?;
        Ok(sim.into_report())
    }

    /// Run the baseline, pick its most congested edge after warm-up, and
    /// re-run once per multiplier with that edge's capacity scaled.
    ///
    /// # Errors
    /// [`SimError::NoCongestion`] if the baseline recorded no minutes after
    /// warm-up or the network has no edges.
    pub fn compare_capacity(&self, multipliers: &[f64]) -> SimResult<Comparison> {
        let baseline = self.run(&[])?;
        let (edge, ratio) = baseline.most_congested().ok_or(SimError::NoCongestion)?;
        info!(
            "most congested edge: {} (mean ratio {ratio:.3})",
            self.network.edge_label(edge)
        );
        self.compare_capacity_on(edge, baseline, multipliers)
    }

    /// Re-run once per multiplier with `edge`'s capacity scaled, next to an
    /// already computed `baseline`.
    pub fn compare_capacity_on(
        &self,
        edge:        EdgeId,
        baseline:    RunReport,
        multipliers: &[f64],
    ) -> SimResult<Comparison> {
        let variants = self.run_variants(edge, multipliers)?;
        Ok(Comparison { edge, baseline, variants })
    }

    fn run_variants(&self, edge: EdgeId, multipliers: &[f64]) -> SimResult<Vec<VariantRun>> {
        let run_one = |&multiplier: &f64| {
            self.run(&[(edge, multiplier)]).map(|report| VariantRun { multiplier, report })
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let collect = || multipliers.par_iter().map(run_one).collect::<SimResult<Vec<_>>>();
            match self.config.num_threads {
                None => collect(),
                Some(n) => rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SimError::Config(e.to_string()))?
                    .install(collect),
            }
        }

        #[cfg(not(feature = "parallel"))]
        {
            multipliers.iter().map(run_one).collect()
        }
    }
}
