//! `tc-traffic`: congestion model, edge ledger, and vehicle movement.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                          |
//! |-------------|-------------------------------------------------------------------|
//! | [`bpr`]     | `BprParams`, `NoiseScale`:  the volume-delay function             |
//! | [`ledger`]  | `EdgeLedger` (per-edge, per-minute arrays), `LedgerView`          |
//! | [`state`]   | `VehicleState`, `Vehicle`                                         |
//! | [`fleet`]   | `Fleet`:  all vehicles plus spawn/active bookkeeping              |
//! | [`engine`]  | `TrafficEngine<R>`:  retire, spawn, advance, refresh              |
//! | [`error`]   | `TrafficError`, `TrafficResult<T>`                                |
//!
//! # Movement model (edge-by-edge with entry gating)
//!
//! 1. At its spawn minute a vehicle is routed.  No route makes it
//!    `Unroutable` for good.
//! 2. It waits at its origin until the first edge has room
//!    (`occupancy < capacity`), then enters.
//! 3. It finishes an edge once the edge's current expected travel time has
//!    elapsed since entry, and then waits at the edge end, still occupying
//!    it, until the next edge has room.
//! 4. At the end of its final edge it is retired in the next minute's retire
//!    phase.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | Routes same-minute spawns on Rayon in snapshot mode.       |
//! | `serde`    | Derives `Serialize`/`Deserialize` on `BprParams`, `RoutingSource`. |

pub mod bpr;
pub mod engine;
pub mod error;
pub mod fleet;
pub mod ledger;
pub mod state;


pub use bpr::{BprParams, NoiseScale};
pub use engine::{FINISH_EPSILON, RoutingSource, SpawnOutcome, StepCounts, TrafficEngine};
pub use error::{TrafficError, TrafficResult};
pub use fleet::{Fleet, StateCounts};
pub use ledger::{EdgeLedger, LedgerView};
pub use state::{Vehicle, VehicleState};
