//! Inter-request pacing with jitter

use crate::config::TrafficConfig;
use crate::error::ConfigError;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use std::time::Duration;

/// Computes the delay before the next request
///
/// The nominal interval is `1 / base_rate`; each delay scales it by a factor
/// drawn uniformly from `[1 - rate_jitter, 1 + rate_jitter]`. Because jitter
/// is validated to lie in `[0, 1)`, delays are never negative.
#[derive(Debug, Clone)]
pub struct Pacer {
    base_interval: f64,
    jitter: f64,
    factor: Option<Uniform<f64>>,
}

impl Pacer {
    /// Create a pacer from a rate and jitter fraction
    ///
    /// # Errors
    /// Rejects non-positive or non-finite rates and jitter outside `[0, 1)`.
    pub fn new(base_rate: f64, rate_jitter: f64) -> Result<Self, ConfigError> {
        if !base_rate.is_finite() || base_rate <= 0.0 {
            return Err(ConfigError::InvalidRate(format!(
                "base_rate must be positive, got {base_rate}"
            )));
        }
        if !(0.0..1.0).contains(&rate_jitter) {
            return Err(ConfigError::InvalidJitter(format!(
                "rate_jitter must be in [0, 1), got {rate_jitter}"
            )));
        }

        let base_interval = 1.0 / base_rate;
        if Duration::try_from_secs_f64(base_interval * (1.0 + rate_jitter)).is_err() {
            return Err(ConfigError::InvalidRate(format!(
                "base_rate {base_rate} gives an interval too long to schedule"
            )));
        }

        let factor = (rate_jitter > 0.0)
            .then(|| Uniform::new_inclusive(1.0 - rate_jitter, 1.0 + rate_jitter));

        Ok(Self {
            base_interval,
            jitter: rate_jitter,
            factor,
        })
    }

    /// Create a pacer from traffic configuration
    pub fn from_config(config: &TrafficConfig) -> Result<Self, ConfigError> {
        Self::new(config.base_rate, config.rate_jitter)
    }

    /// Nominal interval in seconds
    pub fn base_interval(&self) -> f64 {
        self.base_interval
    }

    /// Configured jitter fraction
    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    /// Next delay in seconds
    pub fn next_delay_secs<R: Rng>(&self, rng: &mut R) -> f64 {
        match &self.factor {
            Some(factor) => (self.base_interval * factor.sample(rng)).max(0.0),
            None => self.base_interval,
        }
    }

    /// Next delay as a duration
    pub fn next_delay<R: Rng>(&self, rng: &mut R) -> Duration {
        Duration::from_secs_f64(self.next_delay_secs(rng))
    }
}
