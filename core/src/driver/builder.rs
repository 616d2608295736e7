//! Builder pattern for Driver construction

use crate::config::TrafficConfig;
use crate::connection::ConnectionManager;
use crate::error::{ConfigError, LoadgenError, LoadgenResult};
use crate::executor::QueryExecutor;
use crate::pacer::Pacer;
use crate::probe::ProbeWorker;
use crate::selector::QuerySelector;

use super::runner::{Driver, DriverSettings};

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

/// Executions between periodic summaries
pub const DEFAULT_SUMMARY_EVERY: u64 = 50;

/// Pause after a cycle that could not obtain a connection
pub const DEFAULT_DEFER_DELAY: Duration = Duration::from_secs(2);

/// Upper bound on waiting for the probe during shutdown
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Default per-statement deadline
pub const DEFAULT_STATEMENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for creating Driver instances
///
/// # Example
/// ```ignore
/// let driver = DriverBuilder::new()
///     .traffic(TrafficConfig::load("/app/config.yml")?)
///     .manager(ConnectionManager::new(connector.clone(), "driver"))
///     .probe(ProbeWorker::new(ConnectionManager::new(connector, "probe")))
///     .build()?;
/// ```
pub struct DriverBuilder {
    traffic: TrafficConfig,
    manager: Option<ConnectionManager>,
    probe: Option<ProbeWorker>,
    summary_every: u64,
    defer_delay: Duration,
    drain_timeout: Duration,
    statement_timeout: Option<Duration>,
    seed: Option<u64>,
}

impl Default for DriverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverBuilder {
    /// Create a builder with default traffic settings
    pub fn new() -> Self {
        Self {
            traffic: TrafficConfig::default(),
            manager: None,
            probe: None,
            summary_every: DEFAULT_SUMMARY_EVERY,
            defer_delay: DEFAULT_DEFER_DELAY,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
            statement_timeout: Some(DEFAULT_STATEMENT_TIMEOUT),
            seed: None,
        }
    }

    /// Set the traffic shape
    pub fn traffic(mut self, traffic: TrafficConfig) -> Self {
        self.traffic = traffic;
        self
    }

    /// Set the connection manager for the main loop
    pub fn manager(mut self, manager: ConnectionManager) -> Self {
        self.manager = Some(manager);
        self
    }

    /// Attach a probe worker, spawned once bootstrap succeeds
    pub fn probe(mut self, probe: ProbeWorker) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Executions between periodic summaries
    pub fn summary_every(mut self, n: u64) -> Self {
        self.summary_every = n;
        self
    }

    /// Pause after a deferred cycle
    pub fn defer_delay(mut self, delay: Duration) -> Self {
        self.defer_delay = delay;
        self
    }

    /// Bound on waiting for the probe during shutdown
    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Per-statement deadline; `None` disables it
    pub fn statement_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.statement_timeout = timeout;
        self
    }

    /// Seed the query and jitter RNG for reproducible runs
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the Driver
    ///
    /// # Errors
    /// Returns `MissingConfig` without a manager and `Config` when the
    /// traffic shape or any setting is invalid.
    pub fn build(self) -> LoadgenResult<Driver> {
        let manager = self
            .manager
            .ok_or(LoadgenError::MissingConfig("manager"))?;
        manager.policy().validate()?;

        self.traffic.validate()?;
        let selector = QuerySelector::new(&self.traffic)?;
        let pacer = Pacer::from_config(&self.traffic)?;

        if let Some(probe) = &self.probe {
            probe.validate()?;
        }

        if self.summary_every == 0 {
            return Err(ConfigError::InvalidSetting("summary_every must be at least 1".into()).into());
        }
        if self.statement_timeout == Some(Duration::ZERO) {
            return Err(
                ConfigError::InvalidSetting("statement timeout must be positive".into()).into(),
            );
        }

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Driver::new(
            manager,
            selector,
            pacer,
            QueryExecutor::new().with_timeout(self.statement_timeout),
            self.probe,
            rng,
            DriverSettings {
                summary_every: self.summary_every,
                defer_delay: self.defer_delay,
                drain_timeout: self.drain_timeout,
            },
        ))
    }
}
