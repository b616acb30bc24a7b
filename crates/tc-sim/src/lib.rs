//! `tc-sim`: minute loop driver for the rust_tc congestion simulator.
//!
//! # Minute loop
//!
//! ```text
//! for minute in 0..config.total_ticks:
//!   ① Carry:    the live ledger starts from the previous minute.
//!   ② Retire:   vehicles at the end of their final edge arrive.
//!   ③ Spawn:    due vehicles are routed from their origin
//!               (parallel with the `parallel` feature).
//!   ④ Advance:  active vehicles in ascending VehicleId order enter,
//!               traverse, and leave edges with immediate ledger effect.
//!   ⑤ Refresh:  every edge's travel time for the minute is recomputed.
//!   ⑥ Record:   past warm-up, every edge's occupancy / capacity ratio.
//! ```
//!
//! # Crate layout
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`builder`]   | `SimBuilder`                                            |
//! | [`sim`]       | `Sim`, `run`, `run_ticks`, `report`                     |
//! | [`observer`]  | `SimObserver`, `NoopObserver`, `TickSummary`            |
//! | [`report`]    | `RunReport`, `VehicleRecord`, `CongestionHistory`       |
//! | [`scenario`]  | `Scenario`, `Comparison`, `VariantRun`                  |
//! | [`error`]     | `SimError`, `SimResult<T>`                              |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | Routes same-minute spawns and comparative runs on Rayon.   |
//! | `serde`    | `Serialize`/`Deserialize` on reports and summaries.        |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use tc_core::SimConfig;
//! use tc_sim::{NoopObserver, Scenario, SimBuilder};
//!
//! let mut sim = SimBuilder::new(config.clone(), network.clone(), trips.clone()).build()?;
//! sim.run(&mut NoopObserver)?;
//! println!("{:?}", sim.report().most_congested());
//!
//! let cmp = Scenario::new(config, network, trips).compare_capacity(&[0.5, 2.0])?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod report;
pub mod scenario;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, TickSummary};
pub use report::{CongestionHistory, RunReport, VehicleRecord};
pub use scenario::{Comparison, Scenario, VariantRun};
pub use sim::Sim;
pub use tc_traffic::{BprParams, NoiseScale, RoutingSource};
