//! Trip CSV loader.
//!
//! # CSV format
//!
//! One row per vehicle.  Nodes are referenced by name; rows may appear in
//! any order and keep their file order within a spawn minute.
//!
//! ```csv
//! origin,destination,spawn_minute
//! City 1,City 2,0
//! City 2,City 1,0
//! City 1,City 2,3
//! ```

use std::io::{Read, Write};
use std::path::Path;

use serde::Deserialize;

use tc_core::{Tick, Trip};
use tc_network::RoadNetwork;

use crate::{DemandError, DemandResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TripRecord {
    origin:       String,
    destination:  String,
    spawn_minute: u64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load trips from a CSV file, resolving node names against `network`.
pub fn load_trips_csv(path: &Path, network: &RoadNetwork) -> DemandResult<Vec<Trip>> {
    let file = std::fs::File::open(path)?;
    load_trips_reader(file, network)
}

/// Like [`load_trips_csv`] but accepts any `Read` source.
///
/// # Errors
/// - [`DemandError::Parse`] for malformed rows.
/// - [`DemandError::UnknownNode`] for a name the network does not define.
pub fn load_trips_reader<R: Read>(reader: R, network: &RoadNetwork) -> DemandResult<Vec<Trip>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let resolve = |name: String| {
        network.node_by_name(&name).ok_or(DemandError::UnknownNode(name))
    };

    let mut trips = Vec::new();
    for result in csv_reader.deserialize::<TripRecord>() {
        let row = result.map_err(|e| DemandError::Parse(e.to_string()))?;
        trips.push(Trip::new(
            resolve(row.origin)?,
            resolve(row.destination)?,
            Tick(row.spawn_minute),
        ));
    }
    Ok(trips)
}

/// Write trips in the format read by [`load_trips_reader`].
pub fn write_trips<W: Write>(writer: W, trips: &[Trip], network: &RoadNetwork) -> DemandResult<()> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(["origin", "destination", "spawn_minute"])
        .map_err(|e| DemandError::Parse(e.to_string()))?;
    for trip in trips {
        for node in [trip.origin, trip.destination] {
            if node.index() >= network.node_count() {
                return Err(DemandError::NodeNotFound(node));
            }
        }
        w.write_record([
            network.node_name(trip.origin),
            network.node_name(trip.destination),
            trip.spawn.0.to_string().as_str(),
        ])
        .map_err(|e| DemandError::Parse(e.to_string()))?;
    }
    w.flush()?;
    Ok(())
}
