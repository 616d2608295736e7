//! Driver module: the single-threaded query loop
//!
//! The Driver runs one query at a time: **select -> check -> execute ->
//! record -> pace -> repeat**. Query N+1 is never chosen before query N's
//! result is recorded, which keeps statistics free of synchronization.
//!
//! Lifecycle:
//!
//! 1. Bootstrapping: dial with the startup retry budget
//! 2. Running: paced cycles, deferring any cycle without a connection
//! 3. Draining: stop the probe, close the connection, log final stats
//! 4. Stopped
//!
//! # Example
//!
//! ```ignore
//! use failover_loadgen_core::driver::DriverBuilder;
//!
//! let mut driver = DriverBuilder::new()
//!     .traffic(traffic)
//!     .manager(manager)
//!     .probe(probe)
//!     .build()?;
//!
//! let stats = driver.run(tokio::signal::ctrl_c().map(|_| ())).await?;
//! println!("Executed: {}", stats.total);
//! ```

mod builder;
mod runner;
mod stats;

pub use builder::{
    DriverBuilder, DEFAULT_DEFER_DELAY, DEFAULT_DRAIN_TIMEOUT, DEFAULT_STATEMENT_TIMEOUT,
    DEFAULT_SUMMARY_EVERY,
};
pub use runner::{CycleOutcome, Driver, DriverSettings, DriverState};
pub use stats::RunningStats;

#[cfg(test)]
mod tests;
