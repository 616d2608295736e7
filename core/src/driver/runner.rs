//! Driver loop: bootstrap, paced query cycles and graceful drain

use crate::connection::{ConnectionHandle, ConnectionManager};
use crate::error::LoadgenResult;
use crate::executor::{ExecutionResult, QueryExecutor};
use crate::pacer::Pacer;
use crate::probe::ProbeWorker;
use crate::selector::QuerySelector;
use crate::shutdown::ShutdownSignal;

use super::stats::RunningStats;

use rand::rngs::StdRng;
use std::future::Future;
use std::time::Duration;

/// Lifecycle of a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Waiting for the first connection
    Bootstrapping,
    /// Issuing paced queries
    Running,
    /// Stopping the probe and releasing the connection
    Draining,
    /// Terminal
    Stopped,
}

/// Result of a single Running iteration
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// A statement ran and its result was recorded
    Executed(ExecutionResult),
    /// No connection was available; nothing was recorded
    Deferred,
}

/// Tunables that do not affect traffic shape
#[derive(Debug, Clone, Copy)]
pub struct DriverSettings {
    /// Executions between periodic summaries
    pub summary_every: u64,
    /// Pause after a deferred cycle
    pub defer_delay: Duration,
    /// Bound on waiting for the probe during shutdown
    pub drain_timeout: Duration,
}

/// Issues one query at a time against the router until interrupted
///
/// The driver owns its connection handle and statistics outright; the only
/// state shared with the probe task is the shutdown signal.
pub struct Driver {
    manager: ConnectionManager,
    selector: QuerySelector,
    pacer: Pacer,
    executor: QueryExecutor,
    probe: Option<ProbeWorker>,
    shutdown: ShutdownSignal,
    stats: RunningStats,
    state: DriverState,
    rng: StdRng,
    settings: DriverSettings,
}

impl Driver {
    pub(crate) fn new(
        manager: ConnectionManager,
        selector: QuerySelector,
        pacer: Pacer,
        executor: QueryExecutor,
        probe: Option<ProbeWorker>,
        rng: StdRng,
        settings: DriverSettings,
    ) -> Self {
        Self {
            manager,
            selector,
            pacer,
            executor,
            probe,
            shutdown: ShutdownSignal::new(),
            stats: RunningStats::new(),
            state: DriverState::Bootstrapping,
            rng,
            settings,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Statistics so far
    pub fn stats(&self) -> &RunningStats {
        &self.stats
    }

    /// Manager for the driver's own connection
    pub fn connection_manager(&self) -> &ConnectionManager {
        &self.manager
    }

    /// Non-traffic tunables
    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }

    /// Run one cycle: select, check liveness, execute, record, pace
    ///
    /// If no connection can be re-established the cycle is deferred: it
    /// waits `defer_delay` and records nothing in the execution counters.
    pub async fn step(&mut self, handle: &mut ConnectionHandle) -> CycleOutcome {
        let query = self.selector.select(&mut self.rng);

        if let Err(e) = self.manager.ensure_alive(handle).await {
            tracing::warn!(error = %e, "No database connection, deferring cycle");
            self.stats.record_deferred();
            tokio::time::sleep(self.settings.defer_delay).await;
            return CycleOutcome::Deferred;
        }

        let result = self
            .executor
            .execute(handle, query.statement(), &query.params)
            .await;
        self.stats.record(&result);

        if result.success {
            tracing::info!(
                n = self.stats.total,
                tier = %query.tier,
                query = query.template.name,
                rows = result.row_count,
                ms = format_args!("{:.1}", result.duration_ms()),
                "OK"
            );
        } else {
            tracing::warn!(
                n = self.stats.total,
                tier = %query.tier,
                query = query.template.name,
                ms = format_args!("{:.1}", result.duration_ms()),
                error = result.error.as_deref().unwrap_or("unknown"),
                "FAIL"
            );
        }

        if self.stats.total % self.settings.summary_every == 0 {
            self.stats.log_summary();
        }

        tokio::time::sleep(self.pacer.next_delay(&mut self.rng)).await;
        CycleOutcome::Executed(result)
    }

    /// Drive the full lifecycle until `interrupt` resolves
    ///
    /// The interrupt is honoured during bootstrap and mid-cycle, including
    /// while sleeping between queries. Returns the final statistics.
    ///
    /// # Errors
    /// Returns `FatalBootstrap` when the startup retry budget is exhausted.
    pub async fn run<F>(&mut self, interrupt: F) -> LoadgenResult<RunningStats>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(interrupt);
        self.state = DriverState::Bootstrapping;

        let bootstrapped = tokio::select! {
            biased;
            _ = &mut interrupt => None,
            result = self.manager.bootstrap() => Some(result),
        };

        let mut handle = match bootstrapped {
            Some(Ok(handle)) => handle,
            Some(Err(e)) => {
                tracing::error!(error = %e, "Could not reach the database");
                self.state = DriverState::Stopped;
                return Err(e);
            }
            None => {
                tracing::info!("Interrupted before a connection was established");
                self.state = DriverState::Stopped;
                return Ok(self.stats.clone());
            }
        };

        let probe_task = self.probe.take().map(|probe| {
            tracing::info!(interval = ?probe.interval(), "Starting read replica probe");
            tokio::spawn(probe.run(self.shutdown.listener()))
        });

        self.state = DriverState::Running;
        self.stats.start();
        tracing::info!(
            base_rate = self.pacer.base_interval().recip(),
            jitter = self.pacer.jitter(),
            "Starting load generation"
        );

        loop {
            let cycle = tokio::select! {
                biased;
                _ = &mut interrupt => None,
                outcome = self.step(&mut handle) => Some(outcome),
            };
            if cycle.is_none() {
                tracing::info!("Interrupt received, shutting down");
                break;
            }
        }

        self.state = DriverState::Draining;
        self.shutdown.trigger();

        if let Some(mut task) = probe_task {
            match tokio::time::timeout(self.settings.drain_timeout, &mut task).await {
                Ok(Ok(probe_stats)) => tracing::debug!(
                    cycles = probe_stats.cycles,
                    succeeded = probe_stats.succeeded,
                    failed = probe_stats.failed,
                    "Probe worker finished"
                ),
                Ok(Err(e)) => tracing::warn!(error = %e, "Probe worker panicked"),
                Err(_) => {
                    tracing::warn!(
                        timeout = ?self.settings.drain_timeout,
                        "Probe worker did not stop in time, aborting"
                    );
                    task.abort();
                }
            }
        }

        self.manager.close(&mut handle).await;
        self.stats.log_final();
        self.state = DriverState::Stopped;

        Ok(self.stats.clone())
    }
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("state", &self.state)
            .field("manager", &self.manager)
            .field("pacer", &self.pacer)
            .field("probe", &self.probe.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}
