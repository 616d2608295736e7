//! failover-loadgen-core: synthetic read traffic for database router drills
//!
//! This crate provides the building blocks of a load generator that keeps a
//! steady, realistic mix of read queries flowing through a MySQL-protocol
//! router while its backends fail over, including:
//!
//! - A tiered query catalog and weighted selector
//! - Connection management with bounded bootstrap and redial retries
//! - Error-as-value query execution
//! - Jittered pacing
//! - A sentinel probe that keeps the read-only route exercised
//! - The driver loop tying these together
//!
//! # Example
//!
//! ```ignore
//! use failover_loadgen_core::*;
//! use std::sync::Arc;
//!
//! let connector: Arc<dyn Connector> = Arc::new(MySqlConnector::new(ConnectionConfig::default()));
//! let mut driver = DriverBuilder::new()
//!     .traffic(TrafficConfig::load(DEFAULT_CONFIG_PATH)?)
//!     .manager(ConnectionManager::new(connector.clone(), "driver"))
//!     .probe(ProbeWorker::new(ConnectionManager::new(connector, "probe")))
//!     .build()?;
//! let stats = driver.run(shutdown_signal()).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod config;
pub mod connection;
pub mod driver;
pub mod error;
pub mod executor;
pub mod pacer;
pub mod probe;
pub mod selector;
pub mod shutdown;

pub use catalog::{ParamRule, ParamValue, QueryTemplate, Tier, CATALOG};
pub use config::{ConnectionConfig, TrafficConfig, DEFAULT_CONFIG_PATH};
pub use connection::{
    ConnectionHandle, ConnectionManager, ConnectionState, Connector, MySqlConnector,
    ReconnectPolicy, Session,
};
pub use driver::{CycleOutcome, Driver, DriverBuilder, DriverState, RunningStats};
pub use error::*;
pub use executor::{ExecutionResult, QueryExecutor};
pub use pacer::Pacer;
pub use probe::{ProbeOutcome, ProbeStats, ProbeWorker, PROBE_STATEMENT};
pub use selector::{QuerySelector, SelectedQuery};
pub use shutdown::{ShutdownListener, ShutdownSignal};
