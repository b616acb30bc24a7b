//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing `Tick` counter and one tick is one
//! simulated minute.  Every per-edge timeline (occupancy, expected travel
//! time) is an array indexed by absolute tick, so all schedule arithmetic is
//! exact integer indexing.
//!
//! Vehicles themselves move in continuous minutes (`f64`) inside a tick: an
//! edge entered at 12.4 with a travel time of 3.0 is finished during tick 15.
//! Only the ledger is discretised.

use std::fmt;

use crate::{CoreError, CoreResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation minute.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0 - earlier.0
    }

    /// Start of this minute on the continuous time axis.
    #[inline]
    pub fn as_minutes(self) -> f64 {
        self.0 as f64
    }

    /// The tick containing continuous time `minutes` after rounding to the
    /// nearest minute.  Negative inputs map to tick 0.
    #[inline]
    pub fn round_from(minutes: f64) -> Tick {
        Tick(minutes.round().max(0.0) as u64)
    }

    /// The tick whose start is at or before `minutes`.  Negative inputs map
    /// to tick 0.
    #[inline]
    pub fn floor_from(minutes: f64) -> Tick {
        Tick(minutes.floor().max(0.0) as u64)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tracks the current minute of a run.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// The current tick: advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Break the current minute into (day, hour, minute) components.
    /// Useful for human-readable logging without a datetime library.
    pub fn elapsed_dhm(&self) -> (u64, u32, u32) {
        let total = self.current_tick.0;
        let days = total / 1_440;
        let hours = ((total % 1_440) / 60) as u32;
        let minutes = (total % 60) as u32;
        (days, hours, minutes)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (d, h, m) = self.elapsed_dhm();
        write!(f, "{} (day {} {:02}:{:02})", self.current_tick, d, h, m)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Default look-ahead margin: the longest trip (in minutes) the ledger must
/// be able to project past the last simulated minute.
pub const DEFAULT_HORIZON_MARGIN: u64 = 1_000;

/// Top-level simulation configuration.
///
/// Typically loaded from a JSON file by the application crate and passed to
/// the simulation builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Total minutes to simulate (ticks `0..total_ticks`).
    pub total_ticks: u64,

    /// Minutes excluded from congestion statistics and travel-time samples.
    pub warmup_ticks: u64,

    /// Maximum plausible trip length in minutes.  Ledger arrays are sized to
    /// `total_ticks + horizon_margin` so the router can project trajectories
    /// past the end of the run.
    pub horizon_margin: u64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Worker thread count for parallel comparative runs.  `None` uses all
    /// logical cores.
    pub num_threads: Option<usize>,

    /// Emit an edge snapshot every N ticks.  0 disables snapshots.
    pub output_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            total_ticks:           240,
            warmup_ticks:          120,
            horizon_margin:        DEFAULT_HORIZON_MARGIN,
            seed:                  42,
            num_threads:           None,
            output_interval_ticks: 0,
        }
    }
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Number of per-edge ledger slots: simulated minutes plus look-ahead.
    #[inline]
    pub fn horizon(&self) -> usize {
        (self.total_ticks + self.horizon_margin) as usize
    }

    /// `true` once `tick` is past the warm-up period.
    #[inline]
    pub fn past_warmup(&self, tick: Tick) -> bool {
        tick.0 >= self.warmup_ticks
    }

    /// Check that the run is well formed.
    ///
    /// # Errors
    /// [`CoreError::Config`] if the warm-up is longer than the run or
    /// `num_threads` is `Some(0)`.
    pub fn validate(&self) -> CoreResult<()> {
        if self.warmup_ticks > self.total_ticks {
            return Err(CoreError::Config(format!(
                "warm-up of {} minutes exceeds the run length of {} minutes",
                self.warmup_ticks, self.total_ticks
            )));
        }
        if self.num_threads == Some(0) {
            return Err(CoreError::Config("num_threads must be at least 1".into()));
        }
        Ok(())
    }

    /// Construct a `SimClock` for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new()
    }
}
