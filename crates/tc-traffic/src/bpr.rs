//! Bureau of Public Roads volume-delay function.
//!
//! ```text
//! travel_time = max(0, tt0 * (1 + alpha * (N / C)^beta) + noise)
//! noise ~ Normal(0, s)
//! ```
//!
//! `s` depends on [`NoiseScale`]: with `StdDev` it is `sigma`, with
//! `Variance` it is `sigma²`.  The two disagree for any `sigma != 1`, so the
//! choice is an explicit parameter rather than a hidden constant.

use rand_distr::{Distribution, Normal};

use tc_core::SimRng;

use crate::{TrafficError, TrafficResult};

/// How `sigma` is turned into the standard deviation of the noise draw.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NoiseScale {
    /// Standard deviation = `sigma`.
    #[default]
    StdDev,
    /// Standard deviation = `sigma²`.
    Variance,
}

/// Parameters of the congestion function.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BprParams {
    pub alpha: f64,
    pub beta:  f64,
    pub sigma: f64,
    pub noise: NoiseScale,
}

impl Default for BprParams {
    fn default() -> Self {
        Self { alpha: 0.15, beta: 4.0, sigma: 2.0, noise: NoiseScale::StdDev }
    }
}

impl BprParams {
    /// Noise-free parameters with the standard alpha and beta.
    pub fn deterministic() -> Self {
        Self { sigma: 0.0, ..Self::default() }
    }

    pub fn validate(&self) -> TrafficResult<()> {
        if !(self.alpha >= 0.0 && self.alpha.is_finite()) {
            return Err(TrafficError::InvalidParams(format!("alpha = {}", self.alpha)));
        }
        if !self.beta.is_finite() || self.beta < 0.0 {
            return Err(TrafficError::InvalidParams(format!("beta = {}", self.beta)));
        }
        if !(self.sigma >= 0.0 && self.sigma.is_finite()) {
            return Err(TrafficError::InvalidParams(format!("sigma = {}", self.sigma)));
        }
        Ok(())
    }

    /// Standard deviation actually passed to the normal draw.
    #[inline]
    pub fn noise_std_dev(&self) -> f64 {
        match self.noise {
            NoiseScale::StdDev   => self.sigma,
            NoiseScale::Variance => self.sigma * self.sigma,
        }
    }

    /// Deterministic component `tt0 * (1 + alpha * (N / C)^beta)`.
    ///
    /// A zero capacity is treated as 1 so the ratio stays finite.
    #[inline]
    pub fn congested(&self, tt0: f64, occupancy: u32, capacity: u32) -> f64 {
        let ratio = occupancy as f64 / capacity.max(1) as f64;
        tt0 * (1.0 + self.alpha * ratio.powf(self.beta))
    }

    /// Expected travel time including one noise draw, clamped at zero.
    ///
    /// No draw is taken from `rng` when the noise standard deviation is 0.
    pub fn travel_time(&self, tt0: f64, occupancy: u32, capacity: u32, rng: &mut SimRng) -> f64 {
        let base = self.congested(tt0, occupancy, capacity);
        let std_dev = self.noise_std_dev();
        if std_dev == 0.0 {
            return base.max(0.0);
        }
        let noise = Normal::new(0.0, std_dev)
            .map(|d| d.sample(rng.inner()))
            .unwrap_or(0.0);
        (base + noise).max(0.0)
    }
}
