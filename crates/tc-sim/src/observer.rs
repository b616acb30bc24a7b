//! Simulation observer trait for progress reporting and data collection.

use tc_core::Tick;
use tc_network::RoadNetwork;
use tc_traffic::EdgeLedger;

use crate::report::RunReport;

/// What happened during one simulated minute.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickSummary {
    pub tick:       Tick,
    /// Vehicles that received a route this minute.
    pub spawned:    usize,
    pub arrived:    usize,
    /// Vehicles on the network at the end of the minute.
    pub active:     usize,
    /// Vehicles for which no route was found this minute.
    pub unroutable: usize,
    /// Edge entries made this minute.
    pub entered:    usize,
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// minute loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  Observers get shared references only and
/// cannot alter the run.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
///         if tick.0 % self.interval == 0 {
///             println!("{tick}: {} vehicles on the road", summary.active);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each minute, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each minute.
    fn on_tick_end(&mut self, _tick: Tick, _summary: &TickSummary) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`
    /// minutes) with the live ledger as it stands at the end of `tick`.
    fn on_snapshot(&mut self, _tick: Tick, _network: &RoadNetwork, _ledger: &EdgeLedger) {}

    /// Called once after the final minute of [`Sim::run`][crate::Sim::run].
    fn on_sim_end(&mut self, _final_tick: Tick, _network: &RoadNetwork, _report: &RunReport) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
