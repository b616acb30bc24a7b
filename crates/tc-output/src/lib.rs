//! `tc-output`: simulation output writers for the rust_tc simulator.
//!
//! Two backends are provided behind Cargo features:
//!
//! | Feature   | Backend     | Files created                                          |
//! |-----------|-------------|--------------------------------------------------------|
//! | *(none)*  | CSV         | `edge_loads.csv`, `tick_summaries.csv`, `trips.csv`    |
//! | `sqlite`  | SQLite      | `output.db`                                            |
//!
//! A capacity comparison is written separately with
//! [`write_comparison_csv`] from [`ComparisonRow`]s.
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `tc_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tc_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output")).unwrap();
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run(&mut obs).unwrap();
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use csv::{write_comparison_csv, CsvWriter};
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{ComparisonRow, EdgeLoadRow, TickSummaryRow, TripRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
