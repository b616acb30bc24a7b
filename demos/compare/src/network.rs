//! The road network of the demo: the embedded diamond, or files from disk.
//!
//! Every route of the diamond passes junction C.  The direct C - City 2
//! bridge is the fastest way on but has a single lane, so it is the first
//! segment to saturate:
//!
//! ```text
//!            A                D
//!          /   \            /   \
//!   City 1       C --------------- City 2
//!          \   /            \   /
//!            B                E
//! ```

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use tc_network::{
    add_nodes, load_highways, load_nodes_csv, load_nodes_reader, parse_highways, CapacityModel,
    RoadNetwork, RoadNetworkBuilder,
};

// ── Embedded diamond ──────────────────────────────────────────────────────────

const DIAMOND_NODES: &str = "\
name,x,y,population
City 1,0,0,1000
A,2,2,
B,2,-2,
C,4,0,
D,6,2,
E,6,-2,
City 2,8,0,1000
";

// Lengths in km; every segment is driven at 100 km/h.
const DIAMOND_HIGHWAYS: &str = "\
West:
City 1 - A : 2x2 lanes : 30
City 1 - B : 2x2 lanes : 50
A - C : 2x2 lanes : 40
B - C : 2x2 lanes : 60

Bridge:
C - City 2 : 2x1 lanes : 20

East:
C - D : 2x2 lanes : 20
C - E : 2x2 lanes : 30
D - City 2 : 2x2 lanes : 10
E - City 2 : 2x2 lanes : 5
";

// ── Loading ───────────────────────────────────────────────────────────────────

/// Build the network from a node table and a highway file, falling back to
/// the embedded diamond for whichever of the two is not given.
pub fn build_network(
    nodes:    Option<&Path>,
    highways: Option<&Path>,
    capacity: CapacityModel,
) -> Result<RoadNetwork> {
    let records = match nodes {
        Some(path) => load_nodes_csv(path)
            .with_context(|| format!("loading nodes from {}", path.display()))?,
        None => load_nodes_reader(Cursor::new(DIAMOND_NODES))?,
    };
    let parsed = match highways {
        Some(path) => load_highways(path)
            .with_context(|| format!("loading highways from {}", path.display()))?,
        None => parse_highways(Cursor::new(DIAMOND_HIGHWAYS))?,
    };
    if parsed.skipped > 0 {
        info!("{} malformed highway lines skipped", parsed.skipped);
    }

    let mut builder = RoadNetworkBuilder::with_capacity(records.len(), parsed.segments.len() * 2);
    builder.capacity_model(capacity);
    add_nodes(&mut builder, &records)?;
    parsed.add_to(&mut builder)?;
    Ok(builder.build()?)
}
