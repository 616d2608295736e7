//! Periodic sentinel query against the read-only route
//!
//! The router only keeps a replica route's health state current while
//! traffic flows through it. The probe sends one tagged statement every
//! interval on a fresh connection, so the route stays exercised even when
//! the main traffic never matches it.

use crate::connection::ConnectionManager;
use crate::error::ConfigError;
use crate::executor::QueryExecutor;
use crate::shutdown::ShutdownListener;

use std::time::Duration;

/// Statement the router's query rules match to the read-only hostgroup
pub const PROBE_STATEMENT: &str = "SELECT /* ProxySQL read-only */ 'probe' as status";

/// Default pause between probe cycles
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(10);

/// Result of one probe cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Statement executed
    Success,
    /// Could not open a connection
    DialFailed(String),
    /// Connected but the statement failed
    ExecutionFailed(String),
}

impl ProbeOutcome {
    /// Whether the cycle succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Cycle counters returned when the probe exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeStats {
    /// Cycles attempted
    pub cycles: u64,
    /// Cycles that succeeded
    pub succeeded: u64,
    /// Cycles that failed at any stage
    pub failed: u64,
}

/// Background task issuing the sentinel statement
#[derive(Debug)]
pub struct ProbeWorker {
    manager: ConnectionManager,
    executor: QueryExecutor,
    interval: Duration,
}

impl ProbeWorker {
    /// Create a probe with the default interval
    pub fn new(manager: ConnectionManager) -> Self {
        Self {
            manager,
            executor: QueryExecutor::new(),
            interval: DEFAULT_PROBE_INTERVAL,
        }
    }

    /// Set the pause between cycles
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Bound the sentinel statement by a deadline
    pub fn with_statement_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.executor = self.executor.with_timeout(timeout);
        self
    }

    /// Validate the probe settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::InvalidSetting(
                "probe interval must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Pause between cycles
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one isolated cycle: dial, execute, close
    ///
    /// Nothing is retried; a failure is logged and reported in the outcome.
    pub async fn probe_once(&self) -> ProbeOutcome {
        let mut handle = match self.manager.connect().await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(error = %e, "Read replica probe failed");
                return ProbeOutcome::DialFailed(e.to_string());
            }
        };

        let result = self
            .executor
            .execute(&mut handle, PROBE_STATEMENT, &[])
            .await;
        self.manager.close(&mut handle).await;

        if result.success {
            tracing::info!("Read replica probe successful");
            ProbeOutcome::Success
        } else {
            let error = result.error.unwrap_or_default();
            tracing::warn!(error = %error, "Read replica probe failed");
            ProbeOutcome::ExecutionFailed(error)
        }
    }

    /// Run until shutdown is requested
    pub async fn run(self, shutdown: ShutdownListener) -> ProbeStats {
        let mut stats = ProbeStats::default();
        tracing::debug!(interval = ?self.interval, "Probe worker started");

        while !shutdown.is_triggered() {
            let outcome = self.probe_once().await;
            stats.cycles += 1;
            if outcome.is_success() {
                stats.succeeded += 1;
            } else {
                stats.failed += 1;
            }

            if shutdown.sleep(self.interval).await {
                break;
            }
        }

        tracing::debug!(cycles = stats.cycles, "Probe worker stopped");
        stats
    }
}
