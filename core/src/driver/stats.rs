//! Running statistics owned by the driver loop

use crate::executor::ExecutionResult;
use std::time::{Duration, Instant};

/// Counters accumulated over the life of the process
///
/// Mutated only by the driver loop. `total` always equals
/// `succeeded + failed`; deferred cycles are counted separately and never
/// contribute to `total`.
#[derive(Debug, Default, Clone)]
pub struct RunningStats {
    /// Executions recorded
    pub total: u64,

    /// Executions that succeeded
    pub succeeded: u64,

    /// Executions that failed
    pub failed: u64,

    /// Cycles skipped because no connection could be established
    pub deferred: u64,

    /// Sum of execution durations
    pub cumulative_duration: Duration,

    /// Rows read by successful executions
    pub rows: u64,

    /// When recording started
    pub started_at: Option<Instant>,
}

impl RunningStats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking (records start time)
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Record one execution
    pub fn record(&mut self, result: &ExecutionResult) {
        self.total += 1;
        self.cumulative_duration += result.duration;
        if result.success {
            self.succeeded += 1;
            self.rows += result.row_count as u64;
        } else {
            self.failed += 1;
        }
    }

    /// Record a skipped cycle
    pub fn record_deferred(&mut self) {
        self.deferred += 1;
    }

    /// Success rate (0.0 - 1.0)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.total as f64
        }
    }

    /// Mean execution duration
    pub fn average_duration(&self) -> Duration {
        if self.total == 0 {
            Duration::ZERO
        } else {
            self.cumulative_duration.div_f64(self.total as f64)
        }
    }

    /// Time since start
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|start| start.elapsed())
    }

    /// Achieved request rate
    pub fn requests_per_second(&self) -> f64 {
        self.elapsed()
            .map(|d| {
                let secs = d.as_secs_f64();
                if secs > 0.0 {
                    self.total as f64 / secs
                } else {
                    0.0
                }
            })
            .unwrap_or(0.0)
    }

    /// Emit the periodic summary
    pub fn log_summary(&self) {
        tracing::info!(
            total = self.total,
            success_pct = format_args!("{:.1}", self.success_rate() * 100.0),
            avg_ms = format_args!("{:.1}", self.average_duration().as_secs_f64() * 1000.0),
            rps = format_args!("{:.2}", self.requests_per_second()),
            rows = self.rows,
            "--- Stats ---"
        );
    }

    /// Emit the final summary
    pub fn log_final(&self) {
        if self.total == 0 {
            tracing::info!(deferred = self.deferred, "Final stats: no queries executed");
            return;
        }
        tracing::info!(
            total = self.total,
            succeeded = self.succeeded,
            failed = self.failed,
            deferred = self.deferred,
            rows = self.rows,
            success_pct = format_args!("{:.1}", self.success_rate() * 100.0),
            avg_ms = format_args!("{:.1}", self.average_duration().as_secs_f64() * 1000.0),
            "Final stats"
        );
    }
}
