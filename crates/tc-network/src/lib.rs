//! `tc-network`: road network, ingestion, and routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`network`] | `RoadNetwork` (CSR), `RoadNetworkBuilder`, `CapacityModel`    |
//! | [`router`]  | `Router`, `EdgeCosts`, `Trajectory`, `AStarRouter`, `DijkstraRouter` |
//! | [`highway`] | Highway text format: `parse_highways`, `load_highways`        |
//! | [`nodes`]   | Node table CSV: `load_nodes_csv`, `NodeRecord`                |
//! | [`error`]   | `NetworkError`, `NetworkResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                        |
//! |---------|---------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `CapacityModel` and `RouterConfig`. |

pub mod error;
pub mod highway;
pub mod network;
pub mod nodes;
pub mod router;

#[cfg(test)]
mod tests;

pub use error::{NetworkError, NetworkResult};
pub use highway::{HighwayParse, HighwaySegment, load_highways, parse_highways};
pub use network::{CapacityModel, RoadNetwork, RoadNetworkBuilder, RoadSpec, free_flow_minutes};
pub use nodes::{NodeRecord, add_nodes, load_nodes_csv, load_nodes_reader};
pub use router::{AStarRouter, DijkstraRouter, EdgeCosts, FreeFlow, Router, RouterConfig, Trajectory};
