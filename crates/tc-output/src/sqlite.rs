//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! three tables: `edge_loads`, `tick_summaries`, and `trips`.

use std::path::Path;

use rusqlite::Connection;

use crate::{EdgeLoadRow, OutputResult, TickSummaryRow, TripRow};
use crate::writer::OutputWriter;

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS edge_loads (
                 tick        INTEGER NOT NULL,
                 edge        INTEGER NOT NULL,
                 from_node   TEXT    NOT NULL,
                 to_node     TEXT    NOT NULL,
                 occupancy   INTEGER NOT NULL,
                 capacity    INTEGER NOT NULL,
                 travel_time REAL    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick       INTEGER PRIMARY KEY,
                 spawned    INTEGER NOT NULL,
                 arrived    INTEGER NOT NULL,
                 active     INTEGER NOT NULL,
                 unroutable INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS trips (
                 vehicle     INTEGER PRIMARY KEY,
                 origin      TEXT    NOT NULL,
                 destination TEXT    NOT NULL,
                 spawn       INTEGER NOT NULL,
                 arrival     INTEGER,
                 travel_time INTEGER,
                 path        TEXT    NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_edge_loads(&mut self, rows: &[EdgeLoadRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO edge_loads \
                 (tick, edge, from_node, to_node, occupancy, capacity, travel_time) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.tick,
                    row.edge,
                    row.from,
                    row.to,
                    row.occupancy,
                    row.capacity,
                    row.travel_time,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries (tick, spawned, arrived, active, unroutable) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![row.tick, row.spawned, row.arrived, row.active, row.unroutable],
        )?;
        Ok(())
    }

    fn write_trips(&mut self, rows: &[TripRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO trips \
                 (vehicle, origin, destination, spawn, arrival, travel_time, path) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.vehicle,
                    row.origin,
                    row.destination,
                    row.spawn,
                    row.arrival,
                    row.travel_time,
                    row.path,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
