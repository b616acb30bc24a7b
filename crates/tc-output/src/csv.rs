//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `edge_loads.csv`
//! - `tick_summaries.csv`
//! - `trips.csv`
//!
//! [`write_comparison_csv`] writes the one-shot `comparison.csv` of a
//! capacity comparison.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::{ComparisonRow, EdgeLoadRow, OutputResult, TickSummaryRow, TripRow};
use crate::writer::OutputWriter;

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    loads:     Writer<File>,
    summaries: Writer<File>,
    trips:     Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut loads = Writer::from_path(dir.join("edge_loads.csv"))?;
        loads.write_record(["tick", "edge", "from", "to", "occupancy", "capacity", "travel_time"])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(["tick", "spawned", "arrived", "active", "unroutable"])?;

        let mut trips = Writer::from_path(dir.join("trips.csv"))?;
        trips.write_record(["vehicle", "origin", "destination", "spawn", "arrival", "travel_time", "path"])?;

        Ok(Self {
            loads,
            summaries,
            trips,
            finished: false,
        })
    }
}

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

/// Write `rows` to `path` with a header row.  Missing ratios and travel
/// times are written as empty fields.
pub fn write_comparison_csv(path: &Path, rows: &[ComparisonRow]) -> OutputResult<()> {
    let mut w = Writer::from_path(path)?;
    w.write_record([
        "multiplier", "edge", "from", "to", "capacity",
        "mean_ratio", "peak_ratio", "mean_travel_time", "arrived", "unroutable",
    ])?;
    for row in rows {
        w.write_record(&[
            row.multiplier.to_string(),
            row.edge.to_string(),
            row.from.clone(),
            row.to.clone(),
            row.capacity.to_string(),
            opt(row.mean_ratio),
            opt(row.peak_ratio),
            opt(row.mean_travel_time),
            row.arrived.to_string(),
            row.unroutable.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

impl OutputWriter for CsvWriter {
    fn write_edge_loads(&mut self, rows: &[EdgeLoadRow]) -> OutputResult<()> {
        for row in rows {
            self.loads.write_record(&[
                row.tick.to_string(),
                row.edge.to_string(),
                row.from.clone(),
                row.to.clone(),
                row.occupancy.to_string(),
                row.capacity.to_string(),
                row.travel_time.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.spawned.to_string(),
            row.arrived.to_string(),
            row.active.to_string(),
            row.unroutable.to_string(),
        ])?;
        Ok(())
    }

    fn write_trips(&mut self, rows: &[TripRow]) -> OutputResult<()> {
        for row in rows {
            self.trips.write_record(&[
                row.vehicle.to_string(),
                row.origin.clone(),
                row.destination.clone(),
                row.spawn.to_string(),
                opt(row.arrival),
                opt(row.travel_time),
                row.path.clone(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.loads.flush()?;
        self.summaries.flush()?;
        self.trips.flush()?;
        Ok(())
    }
}
