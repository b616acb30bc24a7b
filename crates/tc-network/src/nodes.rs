//! Node-table CSV loader.
//!
//! # CSV format
//!
//! One row per node.  `population` may be left empty for junctions that do
//! not generate or attract demand.
//!
//! ```csv
//! name,x,y,population
//! City 1,0,0,1000
//! A,2,2,
//! City 2,8,0,1000
//! ```

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use tc_core::Point;

use crate::network::RoadNetworkBuilder;
use crate::{NetworkError, NetworkResult};

// ── CSV record ────────────────────────────────────────────────────────────────

/// One row of a node table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NodeRecord {
    pub name:       String,
    pub x:          f64,
    pub y:          f64,
    pub population: Option<u64>,
}

impl NodeRecord {
    pub fn new(name: impl Into<String>, x: f64, y: f64, population: Option<u64>) -> Self {
        Self { name: name.into(), x, y, population }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a node table from a CSV file.
pub fn load_nodes_csv(path: &Path) -> NetworkResult<Vec<NodeRecord>> {
    let file = std::fs::File::open(path)?;
    load_nodes_reader(file)
}

/// Like [`load_nodes_csv`] but accepts any `Read` source.
pub fn load_nodes_reader<R: Read>(reader: R) -> NetworkResult<Vec<NodeRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    csv_reader
        .deserialize::<NodeRecord>()
        .map(|row| row.map_err(|e| NetworkError::Parse(e.to_string())))
        .collect()
}

/// Add every record to `builder` in table order.
///
/// # Errors
/// [`NetworkError::DuplicateNode`] if a name appears twice.
pub fn add_nodes(builder: &mut RoadNetworkBuilder, records: &[NodeRecord]) -> NetworkResult<()> {
    for r in records {
        builder.add_node(r.name.clone(), Point::new(r.x, r.y), r.population)?;
    }
    Ok(())
}
