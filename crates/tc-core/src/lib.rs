//! `tc-core`: foundational types for the `rust_tc` congestion simulator.
//!
//! This crate is a dependency of every other `tc-*` crate.  It intentionally
//! has no `tc-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `VehicleId`, `NodeId`, `EdgeId`                       |
//! | [`point`]       | `Point`, Euclidean distance for the A* heuristic      |
//! | [`time`]        | `Tick` (one simulated minute), `SimClock`, `SimConfig`|
//! | [`rng`]         | `SimRng` (seeded, splittable)                         |
//! | [`trip`]        | `Trip`:  one vehicle's demand record                  |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod ids;
pub mod point;
pub mod rng;
pub mod time;
pub mod trip;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use ids::{EdgeId, NodeId, VehicleId};
pub use point::Point;
pub use rng::SimRng;
pub use time::{SimClock, SimConfig, Tick};
pub use trip::Trip;
