//! Road network representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_from[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays are sorted by source node and indexed by `EdgeId`.  The
//! sort is stable, so edges leaving the same node keep the order in which
//! they were added.  Successor enumeration in the router is therefore a
//! contiguous scan in a deterministic order.
//!
//! # Derived constants
//!
//! `edge_tt0` (free-flow minutes) and `edge_capacity` (vehicles) are computed
//! once in [`RoadNetworkBuilder::build`] from the raw length / speed / lane
//! attributes.  Both are pure functions of those attributes, see
//! [`free_flow_minutes`] and [`CapacityModel::capacity`].

use std::collections::{HashMap, HashSet};

use log::debug;

use tc_core::{EdgeId, NodeId, Point};

use crate::{NetworkError, NetworkResult};

// ── Derived-constant functions ────────────────────────────────────────────────

/// Free-flow travel time in minutes for `length_m` metres at `speed_kmh`.
#[inline]
pub fn free_flow_minutes(length_m: f64, speed_kmh: f64) -> f64 {
    length_m / speed_kmh * 60.0 / 1000.0
}

/// How many vehicles fit on a road segment.
///
/// `capacity = floor(lanes * length / (car_length + min_spacing))`, then
/// multiplied by `scale`.  `scale` lets a country-scale network be calibrated
/// against a sampled fleet that is much smaller than real traffic.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CapacityModel {
    /// Length of one car in metres.
    pub car_length_m: f64,
    /// Minimum safe gap between consecutive cars in metres.
    pub min_spacing_m: f64,
    /// Uniform multiplier applied to every computed capacity.
    pub scale: f64,
}

impl Default for CapacityModel {
    fn default() -> Self {
        Self { car_length_m: 4.5, min_spacing_m: 55.0, scale: 1.0 }
    }
}

impl CapacityModel {
    /// Capacity of a segment with `lanes` lanes and `length_m` metres.
    ///
    /// Scaling never turns a segment that holds at least one car into an
    /// impassable one: a scaled capacity is at least 1 when the unscaled one
    /// is.
    pub fn capacity(&self, lanes: u32, length_m: f64) -> u32 {
        let base = (lanes as f64 * length_m / (self.car_length_m + self.min_spacing_m)).floor();
        let base = base.max(0.0) as u32;
        if self.scale == 1.0 || base == 0 {
            return base;
        }
        ((base as f64 * self.scale).floor() as u32).max(1)
    }
}

// ── RoadSpec ──────────────────────────────────────────────────────────────────

/// Static attributes of one road segment as supplied by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct RoadSpec {
    pub length_m:  f64,
    pub speed_kmh: f64,
    pub lanes:     u32,
    /// Name of the highway this segment belongs to, if known ("A2").
    pub highway:   Option<String>,
}

impl RoadSpec {
    pub fn new(length_m: f64, speed_kmh: f64, lanes: u32) -> Self {
        Self { length_m, speed_kmh, lanes, highway: None }
    }

    pub fn on_highway(mut self, name: impl Into<String>) -> Self {
        self.highway = Some(name.into());
        self
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed road graph in CSR format with per-edge derived constants.
///
/// All fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`RoadNetworkBuilder`].  A built network is never
/// mutated: per-minute congestion state lives in the traffic ledger.
#[derive(Clone, Debug)]
pub struct RoadNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Human-readable node name ("City 1", "Utrecht").  Indexed by `NodeId`.
    pub node_name: Vec<String>,

    /// Planar position of each node, used by the A* heuristic.
    pub node_pos: Vec<Point>,

    /// Demand weight of each node.  `None` for pure junctions.
    pub node_population: Vec<Option<u64>>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Outgoing edges of node `n` are at EdgeIds
    /// `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    pub edge_from: Vec<NodeId>,
    pub edge_to:   Vec<NodeId>,

    /// Length of each edge in metres.
    pub edge_length_m: Vec<f64>,

    /// Speed limit in km/h.
    pub edge_speed_kmh: Vec<f64>,

    pub edge_lanes: Vec<u32>,

    /// Free-flow travel time in minutes.
    pub edge_tt0: Vec<f64>,

    /// Vehicles the edge holds before entry is refused.
    pub edge_capacity: Vec<u32>,

    pub edge_highway: Vec<Option<String>>,

    name_index: HashMap<String, NodeId>,
}

impl RoadNetwork {
    /// Construct an empty network with no nodes or edges.
    pub fn empty() -> Self {
        Self {
            node_name:       Vec::new(),
            node_pos:        Vec::new(),
            node_population: Vec::new(),
            node_out_start:  vec![0],
            edge_from:       Vec::new(),
            edge_to:         Vec::new(),
            edge_length_m:   Vec::new(),
            edge_speed_kmh:  Vec::new(),
            edge_lanes:      Vec::new(),
            edge_tt0:        Vec::new(),
            edge_capacity:   Vec::new(),
            edge_highway:    Vec::new(),
            name_index:      HashMap::new(),
        }
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_name.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_name.is_empty()
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    /// `NodeId` for a node name, if the name exists.
    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.name_index.get(name).copied()
    }

    pub fn node_name(&self, node: NodeId) -> &str {
        &self.node_name[node.index()]
    }

    /// The first edge from `from` to `to`, if any.
    pub fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.out_edges(from).find(|e| self.edge_to[e.index()] == to)
    }

    /// `"From → To"` label for logs and exports.
    pub fn edge_label(&self, edge: EdgeId) -> String {
        format!(
            "{} → {}",
            self.node_name(self.edge_from[edge.index()]),
            self.node_name(self.edge_to[edge.index()]),
        )
    }

    /// Sum of all node populations.
    pub fn total_population(&self) -> u64 {
        self.node_population.iter().flatten().sum()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    ///
    /// This is a contiguous index range: no heap allocation.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Nodes reachable from `node` by a single outgoing edge.
    #[inline]
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.out_edges(node).map(|e| self.edge_to[e.index()])
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// Nodes must be added before any edge that names them.  `build()` sorts
/// edges by source node, constructs the CSR arrays and derives `tt0` and
/// capacity for every edge.
///
/// # Example
///
/// ```
/// use tc_core::Point;
/// use tc_network::{RoadNetworkBuilder, RoadSpec};
///
/// let mut b = RoadNetworkBuilder::new();
/// b.add_node("A", Point::new(0.0, 0.0), None).unwrap();
/// b.add_node("B", Point::new(1.0, 0.0), None).unwrap();
/// b.add_road_named("A", "B", RoadSpec::new(10_000.0, 100.0, 2)).unwrap();
/// let net = b.build().unwrap();
/// assert_eq!(net.edge_count(), 2); // bidirectional
/// assert_eq!(net.edge_tt0[0], 6.0);
/// ```
pub struct RoadNetworkBuilder {
    nodes:     Vec<RawNode>,
    names:     HashMap<String, NodeId>,
    raw_edges: Vec<RawEdge>,
    capacity:  CapacityModel,
}

struct RawNode {
    name:       String,
    pos:        Point,
    population: Option<u64>,
}

struct RawEdge {
    from: NodeId,
    to:   NodeId,
    spec: RoadSpec,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self {
            nodes:     Vec::new(),
            names:     HashMap::new(),
            raw_edges: Vec::new(),
            capacity:  CapacityModel::default(),
        }
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            names:     HashMap::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
            capacity:  CapacityModel::default(),
        }
    }

    /// Replace the capacity model used by `build()`.
    pub fn capacity_model(&mut self, model: CapacityModel) -> &mut Self {
        self.capacity = model;
        self
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        pos: Point,
        population: Option<u64>,
    ) -> NetworkResult<NodeId> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(NetworkError::DuplicateNode(name));
        }
        let id = NodeId(self.nodes.len() as u32);
        self.names.insert(name.clone(), id);
        self.nodes.push(RawNode { name, pos, population });
        Ok(id)
    }

    /// `NodeId` of a node added earlier.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Add a **directed** edge from `from` to `to`.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, spec: RoadSpec) {
        self.raw_edges.push(RawEdge { from, to, spec });
    }

    /// Convenience: add edges in **both directions** for a two-way segment.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, spec: RoadSpec) {
        self.add_directed_edge(a, b, spec.clone());
        self.add_directed_edge(b, a, spec);
    }

    /// Add a directed edge between two named nodes.
    ///
    /// # Errors
    /// [`NetworkError::UndefinedNode`] if either name was never added.
    pub fn add_directed_edge_named(&mut self, from: &str, to: &str, spec: RoadSpec) -> NetworkResult<()> {
        let (a, b) = self.resolve_pair(from, to)?;
        self.add_directed_edge(a, b, spec);
        Ok(())
    }

    /// Add both directions between two named nodes.
    pub fn add_road_named(&mut self, a: &str, b: &str, spec: RoadSpec) -> NetworkResult<()> {
        let (a, b) = self.resolve_pair(a, b)?;
        self.add_road(a, b, spec);
        Ok(())
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    fn resolve_pair(&self, from: &str, to: &str) -> NetworkResult<(NodeId, NodeId)> {
        let a = self
            .node_id(from)
            .ok_or_else(|| NetworkError::UndefinedNode(from.to_string()))?;
        let b = self
            .node_id(to)
            .ok_or_else(|| NetworkError::UndefinedNode(to.to_string()))?;
        Ok((a, b))
    }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// # Errors
    /// - [`NetworkError::NodeNotFound`] if an edge was added with a raw
    ///   `NodeId` that does not exist.
    /// - [`NetworkError::InvalidEdge`] for a non-positive speed or a negative
    ///   length.
    /// - [`NetworkError::DuplicateEdge`] if the same `(from, to)` pair was
    ///   added twice.
    pub fn build(self) -> NetworkResult<RoadNetwork> {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        let mut seen = HashSet::with_capacity(edge_count);
        for e in &self.raw_edges {
            for id in [e.from, e.to] {
                if id.index() >= node_count {
                    return Err(NetworkError::NodeNotFound(id));
                }
            }
            let reason = if !(e.spec.speed_kmh > 0.0) {
                Some(format!("speed limit must be positive, got {}", e.spec.speed_kmh))
            } else if !(e.spec.length_m >= 0.0) {
                Some(format!("length must be non-negative, got {}", e.spec.length_m))
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(NetworkError::InvalidEdge {
                    from: self.nodes[e.from.index()].name.clone(),
                    to:   self.nodes[e.to.index()].name.clone(),
                    reason,
                });
            }
            if !seen.insert((e.from, e.to)) {
                return Err(NetworkError::DuplicateEdge {
                    from: self.nodes[e.from.index()].name.clone(),
                    to:   self.nodes[e.to.index()].name.clone(),
                });
            }
        }

        // Stable sort keeps insertion order among edges of the same source.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let edge_from:      Vec<NodeId> = raw.iter().map(|e| e.from).collect();
        let edge_to:        Vec<NodeId> = raw.iter().map(|e| e.to).collect();
        let edge_length_m:  Vec<f64>    = raw.iter().map(|e| e.spec.length_m).collect();
        let edge_speed_kmh: Vec<f64>    = raw.iter().map(|e| e.spec.speed_kmh).collect();
        let edge_lanes:     Vec<u32>    = raw.iter().map(|e| e.spec.lanes).collect();
        let edge_tt0: Vec<f64> = raw
            .iter()
            .map(|e| free_flow_minutes(e.spec.length_m, e.spec.speed_kmh))
            .collect();
        let edge_capacity: Vec<u32> = raw
            .iter()
            .map(|e| self.capacity.capacity(e.spec.lanes, e.spec.length_m))
            .collect();
        let edge_highway: Vec<Option<String>> =
            raw.into_iter().map(|e| e.spec.highway).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for from in &edge_from {
            node_out_start[from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let mut node_name       = Vec::with_capacity(node_count);
        let mut node_pos        = Vec::with_capacity(node_count);
        let mut node_population = Vec::with_capacity(node_count);
        for n in self.nodes {
            node_name.push(n.name);
            node_pos.push(n.pos);
            node_population.push(n.population);
        }

        debug!("built road network: {node_count} nodes, {edge_count} edges");

        Ok(RoadNetwork {
            node_name,
            node_pos,
            node_population,
            node_out_start,
            edge_from,
            edge_to,
            edge_length_m,
            edge_speed_kmh,
            edge_lanes,
            edge_tt0,
            edge_capacity,
            edge_highway,
            name_index: self.names,
        })
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
