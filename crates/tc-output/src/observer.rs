//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use tc_core::Tick;
use tc_network::RoadNetwork;
use tc_sim::{RunReport, SimObserver, TickSummary};
use tc_traffic::EdgeLedger;

use crate::row::{EdgeLoadRow, TickSummaryRow, TripRow};
use crate::writer::OutputWriter;
use crate::OutputError;

/// A [`SimObserver`] that writes edge loads, minute summaries, and final trip
/// records to any [`OutputWriter`] backend (CSV, SQLite, …).
///
/// Edge loads are written at the sim's snapshot cadence
/// (`SimConfig::output_interval_ticks`); set it to 0 to skip them.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, _tick: Tick, summary: &TickSummary) {
        let result = self.writer.write_tick_summary(&TickSummaryRow::from(summary));
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, network: &RoadNetwork, ledger: &EdgeLedger) {
        let rows = EdgeLoadRow::snapshot(tick, network, ledger);
        if !rows.is_empty() {
            let result = self.writer.write_edge_loads(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick, network: &RoadNetwork, report: &RunReport) {
        let rows: Vec<TripRow> = report
            .vehicles
            .iter()
            .map(|v| TripRow::from_record(v, network))
            .collect();
        let result = self.writer.write_trips(&rows);
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
    }
}
