//! Routing trait, time-dependent A*, and a static Dijkstra baseline.
//!
//! # Pluggability
//!
//! The traffic engine calls routing via the [`Router`] trait and supplies
//! edge costs through [`EdgeCosts`], so the same router works against a free
//! flow network, a live congestion snapshot, or a forecast that includes
//! earlier vehicles' bookings.
//!
//! # Cost units
//!
//! All costs are minutes (`f64`).  Trajectory timestamps are absolute
//! simulation minutes on the continuous time axis.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tc_core::{EdgeId, NodeId, Tick};

use crate::network::RoadNetwork;

// ── EdgeCosts ─────────────────────────────────────────────────────────────────

/// Time-indexed per-edge cost source consulted while routing.
///
/// `Sync` so that one cost snapshot can be shared by routes computed in
/// parallel.
pub trait EdgeCosts: Sync {
    /// Expected traversal minutes for `edge` when entered at `minute`.
    fn travel_time(&self, edge: EdgeId, minute: Tick) -> f64;

    /// Vehicles expected on `edge` during `minute`.
    fn occupancy(&self, edge: EdgeId, minute: Tick) -> u32;

    /// Vehicles `edge` can hold.
    fn capacity(&self, edge: EdgeId) -> u32;
}

/// Costs of an empty network: every edge at `tt0`, zero occupancy.
pub struct FreeFlow<'a>(pub &'a RoadNetwork);

impl EdgeCosts for FreeFlow<'_> {
    fn travel_time(&self, edge: EdgeId, _minute: Tick) -> f64 {
        self.0.edge_tt0[edge.index()]
    }

    fn occupancy(&self, _edge: EdgeId, _minute: Tick) -> u32 {
        0
    }

    fn capacity(&self, edge: EdgeId) -> u32 {
        self.0.edge_capacity[edge.index()]
    }
}

// ── Trajectory ────────────────────────────────────────────────────────────────

/// A routed path with projected arrival times.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    /// `(node, projected arrival minute)` from origin (departure minute) to
    /// destination.
    pub nodes: Vec<(NodeId, f64)>,
    /// Edges to traverse in order.  `edges.len() == nodes.len() - 1`.
    pub edges: Vec<EdgeId>,
    /// Projected minutes from departure to arrival.
    pub travel_time: f64,
    /// Search cost: `travel_time` plus any saturation penalties.
    pub cost: f64,
}

impl Trajectory {
    /// A zero-length trajectory for a trip that starts at its destination.
    pub fn stationary(node: NodeId, depart: Tick) -> Self {
        Self {
            nodes:       vec![(node, depart.as_minutes())],
            edges:       Vec::new(),
            travel_time: 0.0,
            cost:        0.0,
        }
    }

    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn origin(&self) -> Option<NodeId> {
        self.nodes.first().map(|&(n, _)| n)
    }

    pub fn destination(&self) -> Option<NodeId> {
        self.nodes.last().map(|&(n, _)| n)
    }

    /// Node sequence without timestamps.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|&(n, _)| n)
    }

    /// Per-edge `(edge, projected entry minute, projected exit minute)`.
    pub fn legs(&self) -> impl Iterator<Item = (EdgeId, f64, f64)> + '_ {
        self.edges
            .iter()
            .zip(self.nodes.windows(2))
            .map(|(&e, w)| (e, w[0].1, w[1].1))
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so they can be shared across Rayon
/// worker threads when routes for one minute are computed in parallel and
/// when comparative runs execute concurrently.
pub trait Router: Send + Sync {
    /// Compute a trajectory from `from` to `to` departing at `depart`.
    ///
    /// Returns `None` if no path exists.  `from == to` yields a stationary
    /// trajectory rather than `None`.
    fn route(
        &self,
        network: &RoadNetwork,
        costs: &dyn EdgeCosts,
        from: NodeId,
        to: NodeId,
        depart: Tick,
    ) -> Option<Trajectory>;
}

// ── AStarRouter ───────────────────────────────────────────────────────────────

/// Tunables of the time-dependent A* search.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RouterConfig {
    /// Heuristic = `heuristic_constant` × straight-line distance to the
    /// destination.  Must not overestimate remaining minutes for the search
    /// to stay optimal.
    pub heuristic_constant: f64,
    /// An edge is near saturation when `occupancy + saturation_margin >=
    /// capacity` at the minute the route would enter it.
    pub saturation_margin: u32,
    /// Minutes added to the search cost of a near-saturated edge.
    pub saturation_penalty: f64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            heuristic_constant: 1.0,
            saturation_margin:  2,
            saturation_penalty: 1_000.0,
        }
    }
}

/// Best-first search over partial paths with time-projected edge costs.
///
/// Every frontier entry carries its whole path.  The cost of an edge is read
/// at the minute the path is projected to reach it, so two routes to the same
/// node at different times see different downstream costs.  After each
/// expansion the frontier is stably sorted by total cost and only the
/// cheapest route ending at each node is kept.  Expanded nodes are closed and
/// a path never revisits one of its own nodes, so the search always
/// terminates.
#[derive(Clone, Debug, Default)]
pub struct AStarRouter {
    pub config: RouterConfig,
}

impl AStarRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self { config }
    }
}

struct Candidate {
    nodes:   Vec<(NodeId, f64)>,
    edges:   Vec<EdgeId>,
    elapsed: f64,
    cost:    f64,
    total:   f64,
}

impl Candidate {
    fn last(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1].0
    }

    fn visits(&self, node: NodeId) -> bool {
        self.nodes.iter().any(|&(n, _)| n == node)
    }
}

impl Router for AStarRouter {
    fn route(
        &self,
        network: &RoadNetwork,
        costs: &dyn EdgeCosts,
        from: NodeId,
        to: NodeId,
        depart: Tick,
    ) -> Option<Trajectory> {
        if from.index() >= network.node_count() || to.index() >= network.node_count() {
            return None;
        }
        if from == to {
            return Some(Trajectory::stationary(from, depart));
        }

        let cfg     = &self.config;
        let start   = depart.as_minutes();
        let target  = network.node_pos[to.index()];
        let h       = |n: NodeId| cfg.heuristic_constant * network.node_pos[n.index()].distance(target);

        let mut closed = vec![false; network.node_count()];
        let mut frontier = vec![Candidate {
            nodes:   vec![(from, start)],
            edges:   Vec::new(),
            elapsed: 0.0,
            cost:    0.0,
            total:   h(from),
        }];

        while !frontier.is_empty() {
            let best = frontier.remove(0);
            let last = best.last();

            if last == to {
                return Some(Trajectory {
                    nodes:       best.nodes,
                    edges:       best.edges,
                    travel_time: best.elapsed,
                    cost:        best.cost,
                });
            }
            if closed[last.index()] {
                continue;
            }
            closed[last.index()] = true;

            let minute = Tick::round_from(start + best.elapsed);
            for edge in network.out_edges(last) {
                let next = network.edge_to[edge.index()];
                if closed[next.index()] || best.visits(next) {
                    continue;
                }

                let tt = costs.travel_time(edge, minute);
                let mut step_cost = tt;
                if costs.occupancy(edge, minute).saturating_add(cfg.saturation_margin)
                    >= costs.capacity(edge)
                {
                    step_cost += cfg.saturation_penalty;
                }

                let elapsed = best.elapsed + tt;
                let cost    = best.cost + step_cost;
                let mut nodes = best.nodes.clone();
                nodes.push((next, start + elapsed));
                let mut edges = best.edges.clone();
                edges.push(edge);

                frontier.push(Candidate { nodes, edges, elapsed, cost, total: cost + h(next) });
            }

            // Stable: equal totals keep insertion order.
            frontier.sort_by(|a, b| a.total.total_cmp(&b.total));
            let mut seen = vec![false; network.node_count()];
            frontier.retain(|c| !std::mem::replace(&mut seen[c.last().index()], true));
        }

        None
    }
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm with every edge cost read at the departure
/// minute.
///
/// Ignores saturation penalties.  Against [`FreeFlow`] costs it yields the
/// minimum-`tt0` path and serves as the reference for the A* router.
#[derive(Clone, Copy, Debug, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(
        &self,
        network: &RoadNetwork,
        costs: &dyn EdgeCosts,
        from: NodeId,
        to: NodeId,
        depart: Tick,
    ) -> Option<Trajectory> {
        if from.index() >= network.node_count() || to.index() >= network.node_count() {
            return None;
        }
        if from == to {
            return Some(Trajectory::stationary(from, depart));
        }
        dijkstra(network, costs, from, to, depart)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Totally ordered minute cost for the binary heap.
#[derive(Copy, Clone, PartialEq)]
struct Minutes(f64);

impl Eq for Minutes {}

impl PartialOrd for Minutes {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Minutes {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

fn dijkstra(
    network: &RoadNetwork,
    costs: &dyn EdgeCosts,
    from: NodeId,
    to: NodeId,
    depart: Tick,
) -> Option<Trajectory> {
    let n = network.node_count();
    let mut dist      = vec![f64::INFINITY; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist[from.index()] = 0.0;

    // Secondary key NodeId ensures deterministic tie-breaking.
    let mut heap: BinaryHeap<Reverse<(Minutes, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((Minutes(0.0), from)));

    while let Some(Reverse((Minutes(cost), node))) = heap.pop() {
        if node == to {
            return Some(reconstruct(network, costs, &prev_edge, to, depart));
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for edge in network.out_edges(node) {
            let neighbor = network.edge_to[edge.index()];
            let new_cost = cost + costs.travel_time(edge, depart);

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((Minutes(new_cost), neighbor)));
            }
        }
    }

    None
}

fn reconstruct(
    network: &RoadNetwork,
    costs: &dyn EdgeCosts,
    prev_edge: &[EdgeId],
    to: NodeId,
    depart: Tick,
) -> Trajectory {
    let mut edges = Vec::new();
    let mut cur = to;
    loop {
        let e = prev_edge[cur.index()];
        if e == EdgeId::INVALID {
            break;
        }
        edges.push(e);
        cur = network.edge_from[e.index()];
    }
    edges.reverse();

    let mut t = depart.as_minutes();
    let mut nodes = Vec::with_capacity(edges.len() + 1);
    nodes.push((cur, t));
    for &e in &edges {
        t += costs.travel_time(e, depart);
        nodes.push((network.edge_to[e.index()], t));
    }
    let travel_time = t - depart.as_minutes();

    Trajectory { nodes, edges, travel_time, cost: travel_time }
}
