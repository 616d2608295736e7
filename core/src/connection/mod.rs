//! Connection lifecycle: dialing, liveness checks and transparent redial
//!
//! The physical driver sits behind the [`Connector`] and [`Session`] traits.
//! A [`ConnectionManager`] owns the reconnect policy and hands callers a
//! single logical [`ConnectionHandle`] whose session may be swapped out
//! underneath them when a liveness check fails.
//!
//! Each owning component (the driver loop, the probe worker) holds its own
//! manager and its own handle; handles are never shared.

mod handle;
mod manager;
mod mysql;
mod policy;
mod traits;

#[cfg(test)]
pub(crate) mod mock;

pub use handle::{ConnectionHandle, ConnectionState};
pub use manager::ConnectionManager;
pub use mysql::MySqlConnector;
pub use policy::ReconnectPolicy;
pub use traits::{Connector, Session};
