//! Integration tests for tc-output.

use tc_core::{Point, SimConfig, Tick, Trip};
use tc_network::{RoadNetwork, RoadNetworkBuilder, RoadSpec};

/// Origin → Mid → Dest, 6 + 6 free-flow minutes, plus a one-way spur
/// Dest → Spur so Spur → Origin is unroutable.
fn corridor() -> RoadNetwork {
    let mut b = RoadNetworkBuilder::new();
    for (name, x) in [("Origin", 0.0), ("Mid", 1.0), ("Dest", 2.0), ("Spur", 3.0)] {
        b.add_node(name, Point::new(x, 0.0), None).unwrap();
    }
    b.add_directed_edge_named("Origin", "Mid", RoadSpec::new(10_000.0, 100.0, 2)).unwrap();
    b.add_directed_edge_named("Mid", "Dest", RoadSpec::new(10_000.0, 100.0, 2)).unwrap();
    b.add_directed_edge_named("Dest", "Spur", RoadSpec::new(10_000.0, 100.0, 2)).unwrap();
    b.build().unwrap()
}

fn config(total_ticks: u64, output_interval_ticks: u64) -> SimConfig {
    SimConfig {
        total_ticks,
        warmup_ticks:   0,
        horizon_margin: 100,
        seed:           1,
        num_threads:    Some(1),
        output_interval_ticks,
    }
}

fn trips(net: &RoadNetwork) -> Vec<Trip> {
    let id = |n: &str| net.node_by_name(n).unwrap();
    vec![
        Trip::new(id("Origin"), id("Dest"), Tick(0)),
        Trip::new(id("Origin"), id("Dest"), Tick(1)),
        Trip::new(id("Spur"), id("Origin"), Tick(2)),
    ]
}

// ── Row conversion ────────────────────────────────────────────────────────────

#[cfg(test)]
mod row_tests {
    use tc_core::{NodeId, Tick, VehicleId};
    use tc_sim::{TickSummary, VehicleRecord};
    use tc_traffic::EdgeLedger;

    use crate::row::{EdgeLoadRow, TickSummaryRow, TripRow};
    use super::corridor;

    #[test]
    fn edge_snapshot_one_row_per_edge() {
        let net = corridor();
        let mut ledger = EdgeLedger::new(&net, 10);
        ledger.increment(tc_core::EdgeId(1), Tick(4));
        let rows = EdgeLoadRow::snapshot(Tick(4), &net, &ledger);
        assert_eq!(rows.len(), 3);
        assert_eq!((rows[1].from.as_str(), rows[1].to.as_str()), ("Mid", "Dest"));
        assert_eq!(rows[1].occupancy, 1);
        assert_eq!(rows[1].capacity, 336);
        assert_eq!(rows[1].travel_time, 6.0);
        assert_eq!(rows[0].occupancy, 0);
    }

    #[test]
    fn edge_timeline_covers_the_horizon() {
        let net = corridor();
        let mut ledger = EdgeLedger::new(&net, 10);
        let edge = tc_core::EdgeId(1);
        for minute in 2..5 {
            ledger.increment(edge, Tick(minute));
        }
        ledger.write_travel_time(edge, Tick(3), 9.5);

        let rows = EdgeLoadRow::timeline(edge, &net, &ledger);
        assert_eq!(rows.len(), 10);
        assert!(rows.iter().enumerate().all(|(i, r)| r.tick == i as u64 && r.edge == 1));
        assert_eq!((rows[0].from.as_str(), rows[0].to.as_str()), ("Mid", "Dest"));
        let occupied: Vec<u32> = rows.iter().map(|r| r.occupancy).collect();
        assert_eq!(occupied, [0, 0, 1, 1, 1, 0, 0, 0, 0, 0]);
        assert_eq!(rows[3].travel_time, 9.5);
        assert_eq!(rows[9].travel_time, 6.0);
        assert_eq!(rows[9].capacity, 336);
    }

    #[test]
    fn trip_row_resolves_names() {
        let net = corridor();
        let record = VehicleRecord {
            id:          VehicleId(7),
            origin:      NodeId(0),
            destination: NodeId(2),
            spawn:       Tick(3),
            arrival:     Some(Tick(15)),
            unroutable:  false,
            path:        vec![NodeId(0), NodeId(1), NodeId(2)],
            planned:     Some(12.0),
        };
        let row = TripRow::from_record(&record, &net);
        assert_eq!(row.origin, "Origin");
        assert_eq!(row.path, "Origin > Mid > Dest");
        assert_eq!(row.travel_time, Some(12));
    }

    #[test]
    fn summary_row_from_tick_summary() {
        let s = TickSummary { tick: Tick(9), spawned: 3, arrived: 2, active: 5, unroutable: 1, entered: 4 };
        let row = TickSummaryRow::from(&s);
        assert_eq!(
            row,
            TickSummaryRow { tick: 9, spawned: 3, arrived: 2, active: 5, unroutable: 1 }
        );
    }
}

// ── CSV tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use tc_sim::SimBuilder;

    use crate::csv::CsvWriter;
    use crate::observer::SimOutputObserver;
    use crate::row::TickSummaryRow;
    use crate::writer::OutputWriter;
    use super::{config, corridor, trips};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn headers(path: std::path::PathBuf) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(
            headers(dir.path().join("edge_loads.csv")),
            ["tick", "edge", "from", "to", "occupancy", "capacity", "travel_time"]
        );
        assert_eq!(
            headers(dir.path().join("tick_summaries.csv")),
            ["tick", "spawned", "arrived", "active", "unroutable"]
        );
        assert_eq!(
            headers(dir.path().join("trips.csv")),
            ["vehicle", "origin", "destination", "spawn", "arrival", "travel_time", "path"]
        );
    }

    #[test]
    fn csv_tick_summary_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&TickSummaryRow { tick: 3, spawned: 4, arrived: 1, active: 9, unroutable: 0 })
            .unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].iter().collect::<Vec<_>>(), ["3", "4", "1", "9", "0"]);
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_empty_batches_ok() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_edge_loads(&[]).unwrap();
        w.write_trips(&[]).unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tmp();
        assert!(CsvWriter::new(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn integration_csv() {
        let net = corridor();
        let trips = trips(&net);
        let mut sim = SimBuilder::new(config(20, 5), net, trips)
            .bpr(tc_sim::BprParams::deterministic())
            .build()
            .unwrap();

        let dir = tmp();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = SimOutputObserver::new(writer);
        sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");

        // Snapshots at minutes 0, 5, 10, 15 × 3 edges.
        let mut rdr = csv::Reader::from_path(dir.path().join("edge_loads.csv")).unwrap();
        assert_eq!(rdr.records().count(), 12);

        let mut rdr = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        assert_eq!(rdr.records().count(), 20);

        let mut rdr = csv::Reader::from_path(dir.path().join("trips.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].iter().collect::<Vec<_>>(), ["0", "Origin", "Dest", "0", "12", "12", "Origin > Mid > Dest"]);
        assert_eq!(&rows[1][4], "13");
        // Unroutable: no arrival, no path.
        assert_eq!(rows[2].iter().collect::<Vec<_>>(), ["2", "Spur", "Origin", "2", "", "", ""]);
    }
}

// ── Comparison ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod comparison_tests {
    use tc_core::EdgeId;
    use tc_sim::{BprParams, Scenario};

    use crate::csv::write_comparison_csv;
    use crate::row::ComparisonRow;
    use super::{config, corridor, trips};

    #[test]
    fn comparison_rows_and_file() {
        let net = corridor();
        let trips = trips(&net);
        let scenario = Scenario::new(config(20, 0), net.clone(), trips).bpr(BprParams::deterministic());
        let baseline = scenario.run(&[]).unwrap();
        let cmp = scenario.compare_capacity_on(EdgeId(1), baseline, &[2.0, 0.5]).unwrap();

        let rows = ComparisonRow::from_comparison(&cmp, &net);
        assert_eq!(rows.iter().map(|r| r.multiplier).collect::<Vec<_>>(), [1.0, 2.0, 0.5]);
        assert_eq!(rows.iter().map(|r| r.capacity).collect::<Vec<_>>(), [336, 672, 168]);
        for row in &rows {
            assert_eq!((row.from.as_str(), row.to.as_str()), ("Mid", "Dest"));
            assert_eq!((row.arrived, row.unroutable), (2, 1));
            assert_eq!(row.mean_travel_time, Some(12.0));
            assert!(row.mean_ratio.is_some());
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comparison.csv");
        write_comparison_csv(&path, &rows).unwrap();
        let mut rdr = csv::Reader::from_path(&path).unwrap();
        assert_eq!(&rdr.headers().unwrap()[0], "multiplier");
        let records: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 3);
        assert_eq!(&records[1][4], "672");
    }
}

// ── SQLite tests ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use tc_sim::SimBuilder;

    use crate::observer::SimOutputObserver;
    use crate::row::{EdgeLoadRow, TickSummaryRow};
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;
    use super::{config, corridor, trips};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn load(tick: u64, edge: u32) -> EdgeLoadRow {
        EdgeLoadRow {
            tick,
            edge,
            from:        "Origin".into(),
            to:          "Mid".into(),
            occupancy:   edge * 2,
            capacity:    336,
            travel_time: 6.5,
        }
    }

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("output.db").exists());
    }

    #[test]
    fn sqlite_edge_load_count() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_edge_loads(&[load(1, 0), load(1, 1), load(1, 2)]).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM edge_loads", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 3);
        let tt: f64 = conn
            .query_row("SELECT travel_time FROM edge_loads WHERE edge = 2", [], |r| r.get(0))
            .unwrap();
        assert_eq!(tt, 6.5);
    }

    #[test]
    fn sqlite_tick_summary() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&TickSummaryRow { tick: 7, spawned: 3, arrived: 2, active: 42, unroutable: 1 })
            .unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let (tick, active, unroutable): (i64, i64, i64) = conn
            .query_row(
                "SELECT tick, active, unroutable FROM tick_summaries WHERE tick = 7",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!((tick, active, unroutable), (7, 42, 1));
    }

    #[test]
    fn sqlite_integration_null_arrival() {
        let net = corridor();
        let trips = trips(&net);
        let mut sim = SimBuilder::new(config(20, 0), net, trips).build().unwrap();

        let dir = tmp();
        let mut obs = SimOutputObserver::new(SqliteWriter::new(dir.path()).unwrap());
        sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none());

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let arrival: Option<i64> = conn
            .query_row("SELECT arrival FROM trips WHERE vehicle = 2", [], |r| r.get(0))
            .unwrap();
        assert_eq!(arrival, None);
        let loads: i64 = conn
            .query_row("SELECT COUNT(*) FROM edge_loads", [], |r| r.get(0))
            .unwrap();
        assert_eq!(loads, 0);
    }
}
