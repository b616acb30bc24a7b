//! Unit tests for tc-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EdgeId, NodeId, VehicleId};

    #[test]
    fn index_roundtrip() {
        let id = VehicleId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(VehicleId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(VehicleId::INVALID.0, u32::MAX);
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(EdgeId::default(), EdgeId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(EdgeId(7).to_string(), "EdgeId(7)");
    }
}

#[cfg(test)]
mod point {
    use crate::Point;

    #[test]
    fn zero_distance() {
        let p = Point::new(5.93, 50.91);
        assert_eq!(p.distance(p), 0.0);
    }

    #[test]
    fn pythagorean_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-12);
        assert_eq!(a.distance(b), b.distance(a));
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, SimConfig, Tick};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15) - Tick(10), 5u64);
        assert_eq!(Tick(15).since(Tick(10)), 5);
    }

    #[test]
    fn continuous_conversions() {
        assert_eq!(Tick::round_from(12.4), Tick(12));
        assert_eq!(Tick::round_from(12.5), Tick(13));
        assert_eq!(Tick::floor_from(12.9), Tick(12));
        assert_eq!(Tick::round_from(-3.0), Tick(0));
        assert_eq!(Tick(7).as_minutes(), 7.0);
    }

    #[test]
    fn clock_display() {
        let mut clock = SimClock::new();
        for _ in 0..(1_440 + 61) {
            clock.advance();
        }
        assert_eq!(clock.elapsed_dhm(), (1, 1, 1));
        assert_eq!(clock.to_string(), "T1501 (day 1 01:01)");
    }

    #[test]
    fn horizon_includes_margin() {
        let cfg = SimConfig { total_ticks: 100, horizon_margin: 50, ..SimConfig::default() };
        assert_eq!(cfg.horizon(), 150);
        assert_eq!(cfg.end_tick(), Tick(100));
    }

    #[test]
    fn warmup_boundary() {
        let cfg = SimConfig { warmup_ticks: 10, ..SimConfig::default() };
        assert!(!cfg.past_warmup(Tick(9)));
        assert!(cfg.past_warmup(Tick(10)));
    }

    #[test]
    fn validate_rejects_bad_runs() {
        assert!(SimConfig::default().validate().is_ok());
        let long_warmup = SimConfig { total_ticks: 10, warmup_ticks: 11, ..SimConfig::default() };
        assert!(matches!(long_warmup.validate(), Err(crate::CoreError::Config(_))));
        let no_threads = SimConfig { num_threads: Some(0), ..SimConfig::default() };
        assert!(no_threads.validate().is_err());
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SimRng::new(7);
        let mut b = SimRng::new(7);
        for _ in 0..16 {
            assert_eq!(a.gen_range(0..1_000u32), b.gen_range(0..1_000u32));
        }
    }

    #[test]
    fn children_are_deterministic_and_distinct() {
        let mut root_a = SimRng::new(1);
        let mut root_b = SimRng::new(1);
        let mut c1 = root_a.child(1);
        let mut c1_again = root_b.child(1);
        assert_eq!(c1.gen_range(0..u64::MAX), c1_again.gen_range(0..u64::MAX));

        let mut root = SimRng::new(1);
        let mut x = root.child(1);
        let mut y = root.child(2);
        let xs: Vec<u64> = (0..4).map(|_| x.gen_range(0..u64::MAX)).collect();
        let ys: Vec<u64> = (0..4).map(|_| y.gen_range(0..u64::MAX)).collect();
        assert_ne!(xs, ys);
    }
}

#[cfg(test)]
mod trip {
    use crate::{NodeId, Tick, Trip};

    #[test]
    fn trivial_trip() {
        assert!(Trip::new(NodeId(2), NodeId(2), Tick(0)).is_trivial());
        assert!(!Trip::new(NodeId(2), NodeId(3), Tick(0)).is_trivial());
    }
}
