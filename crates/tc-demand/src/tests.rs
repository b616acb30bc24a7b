//! Unit tests for tc-demand.

use tc_core::Point;
use tc_network::{RoadNetwork, RoadNetworkBuilder, RoadSpec};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Three towns (populations 100, 200, 300) around an unpopulated junction J.
fn towns() -> RoadNetwork {
    let mut b = RoadNetworkBuilder::new();
    b.add_node("North", Point::new(0.0, 1.0), Some(100)).unwrap();
    b.add_node("J", Point::new(0.0, 0.0), None).unwrap();
    b.add_node("East", Point::new(1.0, 0.0), Some(200)).unwrap();
    b.add_node("West", Point::new(-1.0, 0.0), Some(300)).unwrap();
    for town in ["North", "East", "West"] {
        b.add_road_named(town, "J", RoadSpec::new(5_000.0, 100.0, 2)).unwrap();
    }
    b.build().unwrap()
}

// ── TravelMatrix ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod matrix {
    use tc_core::NodeId;
    use crate::TravelMatrix;
    use super::towns;

    #[test]
    fn only_populated_distinct_pairs() {
        let net = towns();
        let m = TravelMatrix::from_network(&net);
        assert_eq!(m.len(), 6);
        let j = net.node_by_name("J").unwrap();
        assert!(m.pairs().iter().all(|p| p.origin != j && p.destination != j));
        assert!(m.pairs().iter().all(|p| p.origin != p.destination));
    }

    #[test]
    fn gravity_fractions() {
        let net = towns();
        let m = TravelMatrix::from_network(&net);
        let id = |n: &str| net.node_by_name(n).unwrap();
        // 100/600 * 200/500
        let f = m.fraction(id("North"), id("East")).unwrap();
        assert!((f - 1.0 / 15.0).abs() < 1e-12);
        // 300/600 * 100/300
        let f = m.fraction(id("West"), id("North")).unwrap();
        assert!((f - 1.0 / 6.0).abs() < 1e-12);
        assert!((m.total_fraction() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pairs_in_node_order() {
        let net = towns();
        let m = TravelMatrix::from_network(&net);
        let order: Vec<(u32, u32)> = m.pairs().iter().map(|p| (p.origin.0, p.destination.0)).collect();
        assert_eq!(order, [(0, 2), (0, 3), (2, 0), (2, 3), (3, 0), (3, 2)]);
    }

    #[test]
    fn single_pair() {
        let m = TravelMatrix::single(NodeId(0), NodeId(3));
        assert_eq!(m.fraction(NodeId(0), NodeId(3)), Some(1.0));
        assert_eq!(m.fraction(NodeId(3), NodeId(0)), None);
    }
}

// ── Sampling ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod sampling {
    use tc_core::{NodeId, SimRng, Tick};
    use crate::{sample_counts, sample_trips, DemandConfig, DemandError, TravelMatrix};
    use super::towns;

    #[test]
    fn zero_std_dev_is_exact() {
        let m = TravelMatrix::single(NodeId(0), NodeId(2));
        let cfg = DemandConfig { total_per_minute: 3.0, std_dev: 0.0, minutes: 4 };
        let trips = sample_trips(&m, &cfg, &mut SimRng::new(1)).unwrap();
        assert_eq!(trips.len(), 12);
        assert!(trips.iter().all(|t| t.origin == NodeId(0) && t.destination == NodeId(2)));
        assert_eq!(trips.iter().filter(|t| t.spawn == Tick(3)).count(), 3);
    }

    #[test]
    fn ordered_by_minute_then_pair() {
        let net = towns();
        let m = TravelMatrix::from_network(&net);
        let cfg = DemandConfig { total_per_minute: 60.0, std_dev: 1.0, minutes: 10 };
        let trips = sample_trips(&m, &cfg, &mut SimRng::new(9)).unwrap();
        let pair_index = |o: NodeId, d: NodeId| {
            m.pairs().iter().position(|p| p.origin == o && p.destination == d).unwrap()
        };
        let keys: Vec<(Tick, usize)> =
            trips.iter().map(|t| (t.spawn, pair_index(t.origin, t.destination))).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert!(trips.iter().all(|t| t.spawn < Tick(10)));
    }

    #[test]
    fn negative_draws_clamped() {
        let m = TravelMatrix::single(NodeId(0), NodeId(1));
        let cfg = DemandConfig { total_per_minute: 0.0, std_dev: 5.0, minutes: 500 };
        let counts = sample_counts(&m, &cfg, &mut SimRng::new(4)).unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].len(), 500);
        assert!(counts[0].iter().any(|&n| n == 0));
        assert!(counts[0].iter().any(|&n| n > 0));
    }

    #[test]
    fn mean_tracks_expected_volume() {
        let m = TravelMatrix::single(NodeId(0), NodeId(1));
        let cfg = DemandConfig { total_per_minute: 85.0, std_dev: 1.5, minutes: 1_000 };
        let counts = sample_counts(&m, &cfg, &mut SimRng::new(42)).unwrap();
        let mean = counts[0].iter().map(|&n| n as f64).sum::<f64>() / 1_000.0;
        assert!((mean - 85.0).abs() < 0.5, "mean = {mean}");
    }

    #[test]
    fn same_seed_same_trips() {
        let net = towns();
        let m = TravelMatrix::from_network(&net);
        let cfg = DemandConfig { total_per_minute: 20.0, std_dev: 2.0, minutes: 30 };
        let a = sample_trips(&m, &cfg, &mut SimRng::new(5)).unwrap();
        let b = sample_trips(&m, &cfg, &mut SimRng::new(5)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_config() {
        let m = TravelMatrix::single(NodeId(0), NodeId(1));
        let cfg = DemandConfig { std_dev: -1.0, ..DemandConfig::default() };
        assert!(matches!(
            sample_trips(&m, &cfg, &mut SimRng::new(1)),
            Err(DemandError::InvalidConfig(_))
        ));
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use tc_core::{Tick, Trip};
    use crate::{load_trips_csv, load_trips_reader, write_trips, DemandError};
    use super::towns;

    const CSV: &str = "\
origin,destination,spawn_minute
North,East,0
West, North ,2
East,West,1
";

    #[test]
    fn resolves_names() {
        let net = towns();
        let trips = load_trips_reader(Cursor::new(CSV), &net).unwrap();
        let id = |n: &str| net.node_by_name(n).unwrap();
        assert_eq!(
            trips,
            [
                Trip::new(id("North"), id("East"), Tick(0)),
                Trip::new(id("West"), id("North"), Tick(2)),
                Trip::new(id("East"), id("West"), Tick(1)),
            ]
        );
    }

    #[test]
    fn unknown_name_rejected() {
        let net = towns();
        let csv = "origin,destination,spawn_minute\nNorth,Atlantis,0\n";
        match load_trips_reader(Cursor::new(csv), &net) {
            Err(DemandError::UnknownNode(name)) => assert_eq!(name, "Atlantis"),
            other => panic!("expected UnknownNode, got {other:?}"),
        }
    }

    #[test]
    fn malformed_minute_rejected() {
        let net = towns();
        let csv = "origin,destination,spawn_minute\nNorth,East,soon\n";
        assert!(matches!(load_trips_reader(Cursor::new(csv), &net), Err(DemandError::Parse(_))));
    }

    #[test]
    fn written_file_loads_back() {
        let net = towns();
        let trips = load_trips_reader(Cursor::new(CSV), &net).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trips.csv");
        write_trips(std::fs::File::create(&path).unwrap(), &trips, &net).unwrap();
        assert_eq!(load_trips_csv(&path, &net).unwrap(), trips);
    }

    #[test]
    fn missing_file_is_io_error() {
        let net = towns();
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_trips_csv(&dir.path().join("absent.csv"), &net),
            Err(DemandError::Io(_))
        ));
    }
}
