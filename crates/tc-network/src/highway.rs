//! Highway text ingestion.
//!
//! # Format
//!
//! Segments are grouped under highway headers.  A header is any non-empty
//! line ending in `:`; every following data line belongs to that highway
//! until the next header.
//!
//! ```text
//! A2:
//! Amsterdam - Utrecht : 2x5 lanes : 26.6
//! Utrecht - Waardenburg : 2x4 lanes : 26.8
//!
//! A12:
//! Utrecht - Gouda : 2x3 lanes : 31.0
//! ```
//!
//! A data line is `<A> - <B> : <carriageways>x<lanes> lanes : <length_km>`.
//! Only the number after the `x` is used as the lane count.  Every segment is
//! two-way, so it yields one edge per direction, both with the fixed
//! [`HIGHWAY_SPEED_KMH`] speed limit.  City names may themselves contain
//! hyphens ("Nieuw-Vennep"); only a spaced ` - ` separates the endpoints.
//!
//! Malformed lines, including a non-positive length, are skipped with a
//! `warn!` and counted; they never abort the load.  A pair listed again in
//! either direction (`B - A` after `A - B`) replaces the earlier listing.  A missing or unreadable file is a hard error.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, warn};

use crate::network::{RoadNetworkBuilder, RoadSpec};
use crate::NetworkResult;

/// Speed limit assigned to every highway segment, in km/h.
pub const HIGHWAY_SPEED_KMH: f64 = 100.0;

/// One two-way road segment read from a highway file.
#[derive(Clone, Debug, PartialEq)]
pub struct HighwaySegment {
    pub highway:  Option<String>,
    pub from:     String,
    pub to:       String,
    pub length_m: f64,
    pub lanes:    u32,
}

/// Result of parsing a highway file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HighwayParse {
    /// Segments in first-seen order.  A pair listed twice, in either
    /// direction, keeps the last listing's attributes.
    pub segments: Vec<HighwaySegment>,
    /// Number of malformed data lines that were skipped.
    pub skipped: usize,
}

impl HighwayParse {
    /// Add both directions of every segment to `builder`.
    ///
    /// Returns the number of directed edges added.
    ///
    /// # Errors
    /// [`NetworkError::UndefinedNode`](crate::NetworkError::UndefinedNode) if
    /// a segment names a node the builder does not know.
    pub fn add_to(&self, builder: &mut RoadNetworkBuilder) -> NetworkResult<usize> {
        for seg in &self.segments {
            let mut spec = RoadSpec::new(seg.length_m, HIGHWAY_SPEED_KMH, seg.lanes);
            spec.highway = seg.highway.clone();
            builder.add_road_named(&seg.from, &seg.to, spec)?;
        }
        Ok(self.segments.len() * 2)
    }

    /// Distinct endpoint names in first-seen order.
    pub fn node_names(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut names = Vec::new();
        for seg in &self.segments {
            for name in [seg.from.as_str(), seg.to.as_str()] {
                if seen.insert(name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

/// Load a highway file from disk.
///
/// # Errors
/// [`NetworkError::Io`](crate::NetworkError::Io) if the file cannot be
/// opened or read.
pub fn load_highways(path: &Path) -> NetworkResult<HighwayParse> {
    let file = File::open(path)?;
    parse_highways(BufReader::new(file))
}

/// Like [`load_highways`] but accepts any buffered reader.
pub fn parse_highways<R: BufRead>(reader: R) -> NetworkResult<HighwayParse> {
    let mut out = HighwayParse::default();
    let mut by_pair: HashMap<(String, String), usize> = HashMap::new();
    let mut current_highway: Option<String> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line_number = idx + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_suffix(':') {
            current_highway = Some(header.trim().to_string());
            continue;
        }

        match parse_segment(line) {
            Ok((from, to, lanes, length_m)) => {
                let seg = HighwaySegment {
                    highway: current_highway.clone(),
                    from,
                    to,
                    length_m,
                    lanes,
                };
                let key = if seg.from <= seg.to {
                    (seg.from.clone(), seg.to.clone())
                } else {
                    (seg.to.clone(), seg.from.clone())
                };
                match by_pair.get(&key) {
                    Some(&i) => {
                        debug!("line {line_number}: {} - {} listed again, replacing", seg.from, seg.to);
                        out.segments[i] = seg;
                    }
                    None => {
                        by_pair.insert(key, out.segments.len());
                        out.segments.push(seg);
                    }
                }
            }
            Err(reason) => {
                warn!("line {line_number}: skipping malformed line ({reason}): {line:?}");
                out.skipped += 1;
            }
        }
    }

    Ok(out)
}

/// Parse `<A> - <B> : <n>x<lanes> lanes : <km>` into
/// `(from, to, lanes, length_m)`.
fn parse_segment(line: &str) -> Result<(String, String, u32, f64), String> {
    let parts: Vec<&str> = line.split(':').collect();
    let [cities, lanes_info, length_str] = parts.as_slice() else {
        return Err(format!("expected 3 ':'-separated fields, found {}", parts.len()));
    };

    let length_str = length_str.trim();
    let length_km: f64 = length_str
        .parse()
        .map_err(|_| format!("invalid length {length_str:?}"))?;
    // Whole metres; a segment shorter than one metre is no road.
    let length_m = (length_km * 1000.0).trunc();
    if !length_m.is_finite() || length_m <= 0.0 {
        return Err(format!("invalid length {length_str:?}"));
    }

    let lanes_info = lanes_info.trim();
    let lanes: u32 = lanes_info
        .split_once('x')
        .and_then(|(_, rest)| rest.split_whitespace().next())
        .and_then(|n| n.parse().ok())
        .filter(|&n| n > 0)
        .ok_or_else(|| format!("unable to parse lanes {lanes_info:?}"))?;

    let ends: Vec<&str> = cities.split(" - ").map(str::trim).collect();
    let [from, to] = ends.as_slice() else {
        return Err(format!("expected two places separated by ' - ', found {}", ends.len()));
    };
    if from.is_empty() || to.is_empty() {
        return Err("empty place name".to_string());
    }

    Ok((from.to_string(), to.to_string(), lanes, length_m))
}
