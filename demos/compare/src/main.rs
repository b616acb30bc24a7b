//! compare: "what if the bottleneck were wider?" on a small road network.
//!
//! Builds the network (the embedded diamond, or node and highway files named
//! in the config), samples gravity demand between its populated nodes, runs
//! a baseline with full output, finds the most congested edge after warm-up
//! and re-runs once per capacity multiplier of that edge.
//!
//! ```text
//! compare [config.json]
//! ```
//!
//! Every config field is optional; see [`DemoConfig`].  Set `RUST_LOG` to
//! change the log level (default `info`).

mod network;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Deserialize;

use tc_core::{SimConfig, SimRng, Trip};
use tc_demand::{load_trips_csv, sample_trips, write_trips, DemandConfig, TravelMatrix};
use tc_network::{AStarRouter, CapacityModel, RoadNetwork, RouterConfig};
use tc_output::{write_comparison_csv, ComparisonRow, OutputWriter, SimOutputObserver};
use tc_sim::{BprParams, Comparison, RoutingSource, RunReport, Scenario, SimBuilder, SimError};

use network::build_network;

// ── Constants ─────────────────────────────────────────────────────────────────

const DEMAND_SEED_OFFSET:  u64      = 1;
const DEFAULT_MULTIPLIERS: [f64; 2] = [0.5, 2.0];

// ── Config ────────────────────────────────────────────────────────────────────

/// Demo configuration, read from the JSON file given as the first argument.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct DemoConfig {
    sim:            SimConfig,
    bpr:            BprParams,
    demand:         DemandConfig,
    capacity:       CapacityModel,
    router:         RouterConfig,
    routing_source: RoutingSource,
    /// Capacity multipliers applied to the most congested edge.
    multipliers:    Vec<f64>,
    /// Node table CSV; the embedded diamond when absent.
    nodes:          Option<PathBuf>,
    /// Highway text file; the embedded diamond when absent.
    highways:       Option<PathBuf>,
    /// Trip table CSV; gravity demand is sampled when absent.
    trips:          Option<PathBuf>,
    output_dir:     PathBuf,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            sim:            SimConfig { output_interval_ticks: 10, ..SimConfig::default() },
            bpr:            BprParams::default(),
            demand:         DemandConfig::default(),
            capacity:       CapacityModel::default(),
            router:         RouterConfig::default(),
            routing_source: RoutingSource::default(),
            multipliers:    DEFAULT_MULTIPLIERS.to_vec(),
            nodes:          None,
            highways:       None,
            trips:          None,
            output_dir:     PathBuf::from("output/compare"),
        }
    }
}

fn load_config() -> Result<DemoConfig> {
    let Some(path) = std::env::args_os().nth(1) else {
        return Ok(DemoConfig::default());
    };
    let file = File::open(&path).with_context(|| format!("opening config {path:?}"))?;
    serde_json::from_reader(file).with_context(|| format!("parsing config {path:?}"))
}

// ── Steps ─────────────────────────────────────────────────────────────────────

fn demand(cfg: &DemoConfig, network: &RoadNetwork) -> Result<Vec<Trip>> {
    if let Some(path) = &cfg.trips {
        let trips = load_trips_csv(path, network)
            .with_context(|| format!("loading trips from {}", path.display()))?;
        info!("loaded {} trips from {}", trips.len(), path.display());
        return Ok(trips);
    }

    let matrix = TravelMatrix::from_network(network);
    if matrix.is_empty() {
        warn!("no populated node pairs; the run will be empty");
    }
    let mut rng = SimRng::new(cfg.sim.seed).child(DEMAND_SEED_OFFSET);
    let trips = sample_trips(&matrix, &cfg.demand, &mut rng)?;

    let file = File::create(cfg.output_dir.join("demand.csv"))?;
    write_trips(file, &trips, network)?;
    Ok(trips)
}

#[cfg(not(feature = "sqlite"))]
fn open_writer(dir: &Path) -> Result<tc_output::CsvWriter> {
    Ok(tc_output::CsvWriter::new(dir)?)
}

#[cfg(feature = "sqlite")]
fn open_writer(dir: &Path) -> Result<tc_output::SqliteWriter> {
    Ok(tc_output::SqliteWriter::new(dir)?)
}

/// Baseline run with per-minute output sent to `writer`.
fn run_baseline<W: OutputWriter>(
    cfg:     &DemoConfig,
    network: &RoadNetwork,
    trips:   &[Trip],
    writer:  W,
) -> Result<RunReport> {
    let mut sim = SimBuilder::new(cfg.sim.clone(), network.clone(), trips.to_vec())
        .router(AStarRouter::new(cfg.router))
        .bpr(cfg.bpr)
        .routing_source(cfg.routing_source)
        .build()?;

    let mut obs = SimOutputObserver::new(writer);
    sim.run(&mut obs)?;
    if let Some(e) = obs.take_error() {
        eprintln!("output error: {e}");
    }

    let report = sim.into_report();
    if report.dropped_writes > 0 {
        warn!("{} ledger writes fell past the horizon", report.dropped_writes);
    }
    Ok(report)
}

fn print_comparison(cmp: &Comparison, network: &RoadNetwork) {
    println!();
    println!("Capacity comparison on {}", network.edge_label(cmp.edge));
    println!(
        "{:>10} {:>9} {:>11} {:>11} {:>13}",
        "multiplier", "capacity", "mean ratio", "peak ratio", "mean minutes"
    );
    println!("{}", "-".repeat(58));
    let fmt = |v: Option<f64>| v.map(|x| format!("{x:.3}")).unwrap_or_else(|| "-".into());
    for row in ComparisonRow::from_comparison(cmp, network) {
        println!(
            "{:>10} {:>9} {:>11} {:>11} {:>13}",
            row.multiplier,
            row.capacity,
            fmt(row.mean_ratio),
            fmt(row.peak_ratio),
            fmt(row.mean_travel_time),
        );
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = load_config()?;
    std::fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("creating {}", cfg.output_dir.display()))?;

    // 1. Road network.
    let network = build_network(cfg.nodes.as_deref(), cfg.highways.as_deref(), cfg.capacity)?;
    println!(
        "Road network: {} nodes, {} edges, population {}",
        network.node_count(),
        network.edge_count(),
        network.total_population()
    );

    // 2. Demand.
    let trips = demand(&cfg, &network)?;
    println!(
        "Demand: {} trips, {} minutes simulated, {} warm-up",
        trips.len(),
        cfg.sim.total_ticks,
        cfg.sim.warmup_ticks
    );

    // 3. Baseline with full output.
    let t0 = Instant::now();
    let baseline = run_baseline(&cfg, &network, &trips, open_writer(&cfg.output_dir)?)?;
    println!(
        "Baseline: {} of {} arrived, {} unroutable ({:.3} s)",
        baseline.arrived_count(),
        baseline.vehicles.len(),
        baseline.unroutable_count(),
        t0.elapsed().as_secs_f64()
    );

    // 4. Variants on the most congested edge.
    let (edge, ratio) = baseline.most_congested().ok_or(SimError::NoCongestion)?;
    info!("most congested edge: {} (mean ratio {ratio:.3})", network.edge_label(edge));

    let scenario = Scenario::new(cfg.sim.clone(), network.clone(), trips)
        .with_router(AStarRouter::new(cfg.router))
        .bpr(cfg.bpr)
        .routing_source(cfg.routing_source);
    let t0 = Instant::now();
    let cmp = scenario.compare_capacity_on(edge, baseline, &cfg.multipliers)?;
    info!(
        "{} variant runs finished in {:.3} s",
        cmp.variants.len(),
        t0.elapsed().as_secs_f64()
    );

    // 5. Report.
    let rows = ComparisonRow::from_comparison(&cmp, &network);
    let path = cfg.output_dir.join("comparison.csv");
    write_comparison_csv(&path, &rows)?;
    print_comparison(&cmp, &network);
    println!();
    println!("Output written to {}", cfg.output_dir.display());

    Ok(())
}
