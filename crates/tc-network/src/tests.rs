//! Unit tests for tc-network.
//!
//! All tests use hand-crafted networks so they run without any data files.

#[cfg(test)]
pub(crate) mod helpers {
    use tc_core::Point;
    use crate::{RoadNetwork, RoadNetworkBuilder, RoadSpec};

    /// Seven-node diamond, all edges one-way towards "City 2" at 100 km/h.
    ///
    /// ```text
    ///            A               D
    ///          /   \           /   \
    /// City 1 -       - C -----------  City 2
    ///          \   /           \   /
    ///            B               E
    /// ```
    ///
    /// Free-flow minutes: City1→A 18, City1→B 30, A→C 24, B→C 36, C→D 12,
    /// C→E 18, C→City2 12, D→City2 6, E→City2 3.  The cheapest path is
    /// City 1 → A → C → City 2 at 54 minutes.
    pub fn diamond() -> RoadNetwork {
        let mut b = RoadNetworkBuilder::new();
        for (name, x, y, pop) in [
            ("City 1", 0.0, 0.0, Some(1_000)),
            ("A", 2.0, 2.0, None),
            ("B", 2.0, -2.0, None),
            ("C", 4.0, 0.0, None),
            ("D", 6.0, 2.0, None),
            ("E", 6.0, -2.0, None),
            ("City 2", 8.0, 0.0, Some(1_000)),
        ] {
            b.add_node(name, Point::new(x, y), pop).unwrap();
        }
        for (from, to, length_m, lanes) in [
            ("City 1", "A", 30_000.0, 2),
            ("City 1", "B", 50_000.0, 2),
            ("A", "C", 40_000.0, 2),
            ("B", "C", 60_000.0, 2),
            ("C", "D", 20_000.0, 2),
            ("C", "E", 30_000.0, 2),
            ("C", "City 2", 20_000.0, 1),
            ("D", "City 2", 10_000.0, 2),
            ("E", "City 2", 5_000.0, 2),
        ] {
            b.add_directed_edge_named(from, to, RoadSpec::new(length_m, 100.0, lanes)).unwrap();
        }
        b.build().unwrap()
    }

    pub fn node(net: &RoadNetwork, name: &str) -> tc_core::NodeId {
        net.node_by_name(name).unwrap()
    }

    pub fn path_names(net: &RoadNetwork, t: &crate::Trajectory) -> Vec<String> {
        t.node_ids().map(|n| net.node_name(n).to_string()).collect()
    }
}

// ── Builder & network structure ────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use tc_core::{NodeId, Point};
    use crate::{CapacityModel, NetworkError, RoadNetworkBuilder, RoadSpec, free_flow_minutes};

    #[test]
    fn empty_build() {
        let net = RoadNetworkBuilder::new().build().unwrap();
        assert_eq!(net.node_count(), 0);
        assert_eq!(net.edge_count(), 0);
        assert!(net.is_empty());
    }

    #[test]
    fn derived_constants() {
        let net = super::helpers::diamond();
        let c = super::helpers::node(&net, "C");
        let city2 = super::helpers::node(&net, "City 2");
        let e = net.find_edge(c, city2).unwrap();
        assert!((net.edge_tt0[e.index()] - 12.0).abs() < 1e-9);
        assert_eq!(net.edge_capacity[e.index()], 336);
    }

    #[test]
    fn derived_constants_are_pure() {
        let model = CapacityModel::default();
        assert_eq!(model.capacity(2, 30_000.0), model.capacity(2, 30_000.0));
        assert_eq!(free_flow_minutes(30_000.0, 100.0), free_flow_minutes(30_000.0, 100.0));

        let a = super::helpers::diamond();
        let b = super::helpers::diamond();
        assert_eq!(a.edge_tt0, b.edge_tt0);
        assert_eq!(a.edge_capacity, b.edge_capacity);
    }

    #[test]
    fn capacity_scale_keeps_roads_passable() {
        let model = CapacityModel { scale: 0.005, ..CapacityModel::default() };
        // 336 * 0.005 = 1.68
        assert_eq!(model.capacity(1, 20_000.0), 1);
        // 10 cars * 0.005 would be 0
        assert_eq!(model.capacity(1, 600.0), 1);
        // Too short for a single car stays impassable.
        assert_eq!(model.capacity(1, 10.0), 0);
    }

    #[test]
    fn csr_neighbors() {
        let net = super::helpers::diamond();
        let c = super::helpers::node(&net, "C");
        let names: Vec<&str> = net.neighbors(c).map(|n| net.node_name(n)).collect();
        assert_eq!(names, ["D", "E", "City 2"]);
        assert_eq!(net.out_degree(super::helpers::node(&net, "City 2")), 0);
        for e in net.out_edges(c) {
            assert_eq!(net.edge_from[e.index()], c);
        }
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut b = RoadNetworkBuilder::new();
        b.add_node("X", Point::default(), None).unwrap();
        let err = b.add_node("X", Point::default(), None).unwrap_err();
        assert!(matches!(err, NetworkError::DuplicateNode(n) if n == "X"));
    }

    #[test]
    fn undefined_node_rejected() {
        let mut b = RoadNetworkBuilder::new();
        b.add_node("X", Point::default(), None).unwrap();
        let err = b
            .add_road_named("X", "Nowhere", RoadSpec::new(1_000.0, 100.0, 1))
            .unwrap_err();
        assert!(matches!(err, NetworkError::UndefinedNode(n) if n == "Nowhere"));
    }

    #[test]
    fn unknown_raw_id_rejected_at_build() {
        let mut b = RoadNetworkBuilder::new();
        let x = b.add_node("X", Point::default(), None).unwrap();
        b.add_directed_edge(x, NodeId(9), RoadSpec::new(1_000.0, 100.0, 1));
        assert!(matches!(b.build(), Err(NetworkError::NodeNotFound(NodeId(9)))));
    }

    #[test]
    fn zero_speed_rejected() {
        let mut b = RoadNetworkBuilder::new();
        b.add_node("X", Point::default(), None).unwrap();
        b.add_node("Y", Point::default(), None).unwrap();
        b.add_road_named("X", "Y", RoadSpec::new(1_000.0, 0.0, 1)).unwrap();
        assert!(matches!(b.build(), Err(NetworkError::InvalidEdge { .. })));
    }

    #[test]
    fn duplicate_edge_rejected() {
        let mut b = RoadNetworkBuilder::new();
        let x = b.add_node("X", Point::default(), None).unwrap();
        let y = b.add_node("Y", Point::default(), None).unwrap();
        b.add_directed_edge(x, y, RoadSpec::new(1_000.0, 100.0, 1));
        b.add_directed_edge(y, x, RoadSpec::new(1_000.0, 100.0, 1));
        b.add_directed_edge(x, y, RoadSpec::new(2_000.0, 100.0, 2));
        let err = b.build().unwrap_err();
        assert!(matches!(err, NetworkError::DuplicateEdge { from, to } if from == "X" && to == "Y"));
    }

    #[test]
    fn labels_and_population() {
        let net = super::helpers::diamond();
        let e = net
            .find_edge(super::helpers::node(&net, "City 1"), super::helpers::node(&net, "A"))
            .unwrap();
        assert_eq!(net.edge_label(e), "City 1 → A");
        assert_eq!(net.total_population(), 2_000);
    }
}

// ── Highway ingestion ─────────────────────────────────────────────────────────

#[cfg(test)]
mod highway {
    use std::io::Cursor;

    use tc_core::Point;
    use crate::{NetworkError, RoadNetworkBuilder, load_highways, parse_highways};

    const SAMPLE: &str = "\
A2:
Amsterdam - Utrecht : 2x5 lanes : 26.6
Utrecht - Waardenburg : 2x4 lanes : 26.8

A4:
Leiden - Nieuw-Vennep : 2x2 lanes : 17.8
this line has no fields
Leiden - Schiphol : 2xthree lanes : 26.7
Leiden - Den Haag : 2x3 lanes : far
Amsterdam - Utrecht : 2x3 lanes : 27.0
";

    #[test]
    fn parses_segments_and_counts_skips() {
        let parsed = parse_highways(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(parsed.skipped, 3);
        assert_eq!(parsed.segments.len(), 3);

        let first = &parsed.segments[0];
        assert_eq!(first.from, "Amsterdam");
        assert_eq!(first.to, "Utrecht");
        // Later listing of the same pair wins, position is kept.
        assert_eq!(first.lanes, 3);
        assert_eq!(first.length_m, 27_000.0);
        assert_eq!(first.highway.as_deref(), Some("A4"));

        let hyphen = &parsed.segments[2];
        assert_eq!(hyphen.to, "Nieuw-Vennep");
        assert_eq!(hyphen.lanes, 2);
        assert_eq!(hyphen.length_m, 17_800.0);
    }

    #[test]
    fn segments_are_two_way() {
        let parsed = parse_highways(Cursor::new("A1:\nX - Y : 2x2 lanes : 10\n")).unwrap();
        let mut b = RoadNetworkBuilder::new();
        for name in parsed.node_names() {
            b.add_node(name, Point::default(), None).unwrap();
        }
        assert_eq!(parsed.add_to(&mut b).unwrap(), 2);
        let net = b.build().unwrap();
        let x = net.node_by_name("X").unwrap();
        let y = net.node_by_name("Y").unwrap();
        let xy = net.find_edge(x, y).unwrap();
        let yx = net.find_edge(y, x).unwrap();
        assert_eq!(net.edge_speed_kmh[xy.index()], 100.0);
        assert_eq!(net.edge_tt0[xy.index()], net.edge_tt0[yx.index()]);
        assert_eq!(net.edge_highway[yx.index()].as_deref(), Some("A1"));
    }

    #[test]
    fn reversed_listing_replaces_the_pair() {
        let text = "A1:\nX - Y : 2x2 lanes : 10\nA2:\nY - X : 2x3 lanes : 12\n";
        let parsed = parse_highways(Cursor::new(text)).unwrap();
        assert_eq!(parsed.segments.len(), 1);
        assert_eq!(parsed.segments[0].from, "Y");
        assert_eq!(parsed.segments[0].lanes, 3);

        let mut b = RoadNetworkBuilder::new();
        for name in parsed.node_names() {
            b.add_node(name, Point::default(), None).unwrap();
        }
        parsed.add_to(&mut b).unwrap();
        let net = b.build().unwrap();
        assert_eq!(net.edge_count(), 2);

        let x = net.node_by_name("X").unwrap();
        let y = net.node_by_name("Y").unwrap();
        let xy: Vec<_> = net.out_edges(x).filter(|e| net.edge_to[e.index()] == y).collect();
        assert_eq!(xy.len(), 1);
        assert_eq!(net.edge_lanes[xy[0].index()], 3);
        assert_eq!(net.edge_length_m[xy[0].index()], 12_000.0);
        assert_eq!(net.edge_highway[xy[0].index()].as_deref(), Some("A2"));
    }

    #[test]
    fn non_positive_length_is_skipped() {
        let text = "X - Y : 2x2 lanes : 0\nX - Z : 2x2 lanes : -3\nY - Z : 2x2 lanes : 0.0004\nZ - W : 2x1 lanes : 1\n";
        let parsed = parse_highways(Cursor::new(text)).unwrap();
        assert_eq!(parsed.skipped, 3);
        assert_eq!(parsed.segments.len(), 1);
        assert_eq!(parsed.segments[0].length_m, 1_000.0);
    }

    #[test]
    fn unknown_city_is_a_configuration_error() {
        let parsed = parse_highways(Cursor::new("X - Y : 2x2 lanes : 10\n")).unwrap();
        let mut b = RoadNetworkBuilder::new();
        b.add_node("X", Point::default(), None).unwrap();
        assert!(matches!(parsed.add_to(&mut b), Err(NetworkError::UndefinedNode(n)) if n == "Y"));
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_highways(&dir.path().join("missing.txt"));
        assert!(matches!(result, Err(NetworkError::Io(_))));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("highways.txt");
        std::fs::write(&path, SAMPLE).unwrap();
        let parsed = load_highways(&path).unwrap();
        assert_eq!(parsed.segments.len(), 3);
    }
}

// ── Node table ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod nodes {
    use std::io::Cursor;

    use crate::{NetworkError, RoadNetworkBuilder, add_nodes, load_nodes_reader};

    #[test]
    fn optional_population() {
        let csv = "name,x,y,population\nCity 1,0,0,1000\nA,2,2,\n";
        let rows = load_nodes_reader(Cursor::new(csv)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].population, Some(1_000));
        assert_eq!(rows[1].population, None);
        assert_eq!(rows[1].x, 2.0);
    }

    #[test]
    fn bad_coordinate_is_parse_error() {
        let csv = "name,x,y,population\nCity 1,zero,0,1000\n";
        assert!(matches!(load_nodes_reader(Cursor::new(csv)), Err(NetworkError::Parse(_))));
    }

    #[test]
    fn add_nodes_in_order() {
        let csv = "name,x,y,population\nP,0,0,10\nQ,1,0,\n";
        let rows = load_nodes_reader(Cursor::new(csv)).unwrap();
        let mut b = RoadNetworkBuilder::new();
        add_nodes(&mut b, &rows).unwrap();
        assert_eq!(b.node_id("Q").unwrap().0, 1);
        assert!(add_nodes(&mut b, &rows).is_err());
    }
}

// ── Routing ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use tc_core::{EdgeId, Point, Tick};
    use crate::{
        AStarRouter, DijkstraRouter, EdgeCosts, FreeFlow, RoadNetwork, RoadNetworkBuilder,
        RoadSpec, Router,
    };
    use super::helpers::{diamond, node, path_names};

    /// Free-flow costs with overrides for one edge.
    struct Patched<'a> {
        net:       &'a RoadNetwork,
        edge:      EdgeId,
        occupancy: u32,
        /// `(from_minute, travel_time)`: the edge costs `travel_time` from
        /// that minute on.
        slow_from: Option<(u64, f64)>,
    }

    impl EdgeCosts for Patched<'_> {
        fn travel_time(&self, edge: EdgeId, minute: Tick) -> f64 {
            match self.slow_from {
                Some((m, tt)) if edge == self.edge && minute.0 >= m => tt,
                _ => self.net.edge_tt0[edge.index()],
            }
        }
        fn occupancy(&self, edge: EdgeId, _minute: Tick) -> u32 {
            if edge == self.edge { self.occupancy } else { 0 }
        }
        fn capacity(&self, edge: EdgeId) -> u32 {
            self.net.edge_capacity[edge.index()]
        }
    }

    #[test]
    fn free_flow_minimum_path() {
        let net = diamond();
        let (c1, c2) = (node(&net, "City 1"), node(&net, "City 2"));
        let t = AStarRouter::default().route(&net, &FreeFlow(&net), c1, c2, Tick(0)).unwrap();
        assert_eq!(path_names(&net, &t), ["City 1", "A", "C", "City 2"]);
        assert!((t.travel_time - 54.0).abs() < 1e-9);
        assert_eq!(t.edges.len(), 3);
    }

    #[test]
    fn matches_dijkstra_on_static_weights() {
        let net = diamond();
        let costs = FreeFlow(&net);
        for from in 0..net.node_count() as u32 {
            for to in 0..net.node_count() as u32 {
                let (from, to) = (tc_core::NodeId(from), tc_core::NodeId(to));
                let a = AStarRouter::default().route(&net, &costs, from, to, Tick(5));
                let d = DijkstraRouter.route(&net, &costs, from, to, Tick(5));
                match (a, d) {
                    (Some(a), Some(d)) => {
                        assert!((a.travel_time - d.travel_time).abs() < 1e-9);
                        assert_eq!(a.edges, d.edges);
                    }
                    (None, None) => {}
                    (a, d) => panic!("{from}->{to}: astar {a:?} dijkstra {d:?}"),
                }
            }
        }
    }

    #[test]
    fn trajectory_timestamps() {
        let net = diamond();
        let (c1, c2) = (node(&net, "City 1"), node(&net, "City 2"));
        let t = AStarRouter::default().route(&net, &FreeFlow(&net), c1, c2, Tick(10)).unwrap();
        let times: Vec<f64> = t.nodes.iter().map(|&(_, m)| m).collect();
        assert_eq!(times, [10.0, 28.0, 52.0, 64.0]);
        let legs: Vec<(f64, f64)> = t.legs().map(|(_, a, b)| (a, b)).collect();
        assert_eq!(legs, [(10.0, 28.0), (28.0, 52.0), (52.0, 64.0)]);
        assert_eq!(t.origin(), Some(c1));
        assert_eq!(t.destination(), Some(c2));
    }

    #[test]
    fn saturated_edge_is_avoided() {
        let net = diamond();
        let (c, c2) = (node(&net, "C"), node(&net, "City 2"));
        let bottleneck = net.find_edge(c, c2).unwrap();
        let costs = Patched { net: &net, edge: bottleneck, occupancy: 334, slow_from: None };
        let t = AStarRouter::default()
            .route(&net, &costs, node(&net, "City 1"), c2, Tick(0))
            .unwrap();
        assert_eq!(path_names(&net, &t), ["City 1", "A", "C", "D", "City 2"]);
        assert!((t.travel_time - 60.0).abs() < 1e-9);

        // Three below capacity is not near saturation.
        let costs = Patched { occupancy: 333, ..costs };
        let t = AStarRouter::default()
            .route(&net, &costs, node(&net, "City 1"), c2, Tick(0))
            .unwrap();
        assert_eq!(path_names(&net, &t), ["City 1", "A", "C", "City 2"]);
    }

    #[test]
    fn costs_read_at_projected_minute() {
        let net = diamond();
        let (c, c2) = (node(&net, "C"), node(&net, "City 2"));
        let bottleneck = net.find_edge(c, c2).unwrap();
        // The route reaches C at minute 42, when the bottleneck is slow.
        let costs = Patched { net: &net, edge: bottleneck, occupancy: 0, slow_from: Some((30, 100.0)) };
        let c1 = node(&net, "City 1");

        let a = AStarRouter::default().route(&net, &costs, c1, c2, Tick(0)).unwrap();
        assert_eq!(path_names(&net, &a), ["City 1", "A", "C", "D", "City 2"]);

        // A static search at the departure minute never sees the slowdown.
        let d = DijkstraRouter.route(&net, &costs, c1, c2, Tick(0)).unwrap();
        assert_eq!(path_names(&net, &d), ["City 1", "A", "C", "City 2"]);
    }

    #[test]
    fn trivial_same_node() {
        let net = diamond();
        let c1 = node(&net, "City 1");
        let t = AStarRouter::default().route(&net, &FreeFlow(&net), c1, c1, Tick(3)).unwrap();
        assert!(t.is_trivial());
        assert_eq!(t.travel_time, 0.0);
        assert_eq!(t.nodes, [(c1, 3.0)]);
    }

    #[test]
    fn no_path_when_predecessor_loses_its_edges() {
        // P <-> Q -> R: remove Q -> R and R becomes unreachable, while the
        // P <-> Q cycle must not keep the search alive.
        let mut b = RoadNetworkBuilder::new();
        let p = b.add_node("P", Point::new(0.0, 0.0), None).unwrap();
        let q = b.add_node("Q", Point::new(1.0, 0.0), None).unwrap();
        let r = b.add_node("R", Point::new(2.0, 0.0), None).unwrap();
        b.add_road(p, q, RoadSpec::new(1_000.0, 100.0, 1));
        let net = b.build().unwrap();

        assert!(AStarRouter::default().route(&net, &FreeFlow(&net), p, r, Tick(0)).is_none());
        assert!(DijkstraRouter.route(&net, &FreeFlow(&net), p, r, Tick(0)).is_none());
    }

    #[test]
    fn one_way_blocks_return() {
        let net = diamond();
        let (c1, c2) = (node(&net, "City 1"), node(&net, "City 2"));
        assert!(AStarRouter::default().route(&net, &FreeFlow(&net), c2, c1, Tick(0)).is_none());
    }
}
