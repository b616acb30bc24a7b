//! The `Sim` struct and its minute loop.

use log::info;

use tc_core::{SimClock, SimConfig, Tick};
use tc_network::{RoadNetwork, Router};
use tc_traffic::TrafficEngine;

use crate::observer::TickSummary;
use crate::report::{CongestionHistory, RunReport, VehicleRecord};
use crate::{SimError, SimObserver, SimResult};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<R>` owns one run's network, fleet and ledgers and drives the
/// per-minute phases of [`TrafficEngine::step`] in a fixed order:
///
/// 1. **Carry forward**: minute `t` starts from the end of `t - 1`.
/// 2. **Retire**: vehicles at the end of their final edge arrive.
/// 3. **Spawn**: due vehicles are routed (optionally parallel with the
///    `parallel` feature).
/// 4. **Advance**: every active vehicle, ascending `VehicleId`, moves as far
///    as the minute and the capacity of its next edge allow.
/// 5. **Refresh**: every edge's travel time for `t` is recomputed.
///
/// Minutes at or after `config.warmup_ticks` are then sampled into the
/// congestion history.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<R: Router> {
    /// Global configuration (total minutes, warm-up, seed, …).
    pub config: SimConfig,

    /// Simulation clock: the next minute to process.
    pub clock: SimClock,

    /// Road network.  Never mutated during a run.
    pub network: RoadNetwork,

    /// Fleet, live ledger, and router.
    pub engine: TrafficEngine<R>,

    /// Per-edge congestion ratios after warm-up.
    pub history: CongestionHistory,
}

impl<R: Router> Sim<R> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current minute to `config.end_tick()`.
    ///
    /// Calls observer hooks at every minute boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        loop {
            let now = self.clock.current_tick;
            if now >= self.config.end_tick() {
                break;
            }
            self.run_one(now, observer)?;
        }

        let report = self.report();
        info!(
            "run finished at {}: {} of {} vehicles arrived, {} unroutable",
            self.clock,
            report.arrived_count(),
            report.vehicles.len(),
            report.unroutable_count(),
        );
        observer.on_sim_end(self.clock.current_tick, &self.network, &report);
        Ok(())
    }

    /// Run exactly `n` minutes from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    ///
    /// # Errors
    /// [`SimError::PastHorizon`] when a minute falls outside the ledger.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            let now = self.clock.current_tick;
            self.run_one(now, observer)?;
        }
        Ok(())
    }

    /// Snapshot of the run so far.
    pub fn report(&self) -> RunReport {
        RunReport {
            warmup:         Tick(self.config.warmup_ticks),
            final_tick:     self.clock.current_tick,
            vehicles:       self.engine.fleet.vehicles.iter().map(VehicleRecord::from_vehicle).collect(),
            congestion:     self.history.clone(),
            dropped_writes: self.engine.live.dropped_writes(),
        }
    }

    /// Consume the sim and return its report without cloning the history.
    pub fn into_report(self) -> RunReport {
        RunReport {
            warmup:         Tick(self.config.warmup_ticks),
            final_tick:     self.clock.current_tick,
            vehicles:       self.engine.fleet.vehicles.iter().map(VehicleRecord::from_vehicle).collect(),
            congestion:     self.history,
            dropped_writes: self.engine.live.dropped_writes(),
        }
    }

    // ── Core minute processing ────────────────────────────────────────────

    fn run_one<O: SimObserver>(&mut self, now: Tick, observer: &mut O) -> SimResult<()> {
        observer.on_tick_start(now);
        let summary = self.process_tick(now)?;
        observer.on_tick_end(now, &summary);
        if self.config.output_interval_ticks > 0
            && now.0.is_multiple_of(self.config.output_interval_ticks)
        {
            observer.on_snapshot(now, &self.network, &self.engine.live);
        }
        self.clock.advance();
        Ok(())
    }

    fn process_tick(&mut self, now: Tick) -> SimResult<TickSummary> {
        let horizon = self.engine.live.horizon();
        if now.0 as usize >= horizon {
            return Err(SimError::PastHorizon { tick: now, horizon });
        }

        let counts = self.engine.step(&self.network, now);

        if self.config.past_warmup(now) {
            self.history.record(now, &self.engine.live);
        }

        Ok(TickSummary {
            tick:       now,
            spawned:    counts.spawned,
            arrived:    counts.arrived,
            active:     self.engine.fleet.active_ids().len(),
            unroutable: counts.unroutable,
            entered:    counts.entered,
        })
    }
}
