//! The `OutputWriter` trait implemented by all backend writers.

use crate::{EdgeLoadRow, OutputResult, TickSummaryRow, TripRow};

/// Trait implemented by the CSV and SQLite writers.
///
/// All methods are infallible from the observer's perspective: errors are
/// stored internally and retrieved with
/// [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write one snapshot of every edge's load.
    fn write_edge_loads(&mut self, rows: &[EdgeLoadRow]) -> OutputResult<()>;

    /// Write one minute summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Write the final per-vehicle records.
    fn write_trips(&mut self, rows: &[TripRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
