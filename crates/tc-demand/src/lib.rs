//! `tc-demand`: trip demand for the congestion simulator.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`gravity`] | `TravelMatrix`, `OdPair`, `DemandConfig`, `sample_trips`    |
//! | [`loader`]  | `load_trips_csv`, `load_trips_reader`, `write_trips`        |
//! | [`error`]   | `DemandError`, `DemandResult<T>`                            |
//!
//! Demand is built once, before a run, and handed to the simulator as a
//! `Vec<Trip>`; nothing here runs during the simulation.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                    |
//! |---------|-----------------------------------------------------------|
//! | `serde` | `Serialize`/`Deserialize` on `DemandConfig`               |

pub mod error;
pub mod gravity;
pub mod loader;

#[cfg(test)]
mod tests;

pub use error::{DemandError, DemandResult};
pub use gravity::{sample_counts, sample_trips, DemandConfig, OdPair, TravelMatrix};
pub use loader::{load_trips_csv, load_trips_reader, write_trips};
