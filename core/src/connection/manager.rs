//! Dialing, liveness checks and bounded reconnects

use super::handle::{ConnectionHandle, ConnectionState};
use super::policy::ReconnectPolicy;
use super::traits::Connector;
use crate::error::{LoadgenError, LoadgenResult};

use std::sync::Arc;

/// Owns the reconnect policy for one component's connection
///
/// The driver loop and the probe worker each build their own manager; the
/// connector behind it is stateless and may be shared.
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    policy: ReconnectPolicy,
    role: &'static str,
}

impl ConnectionManager {
    /// Create a manager with the default policy
    pub fn new(connector: Arc<dyn Connector>, role: &'static str) -> Self {
        Self {
            connector,
            policy: ReconnectPolicy::default(),
            role,
        }
    }

    /// Replace the reconnect policy
    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Active reconnect policy
    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// Component this manager serves, for log output
    pub fn role(&self) -> &'static str {
        self.role
    }

    /// Dial once
    pub async fn connect(&self) -> LoadgenResult<ConnectionHandle> {
        let session = self.connector.dial().await?;
        tracing::debug!(
            role = self.role,
            endpoint = %self.connector.endpoint(),
            "Connected"
        );
        Ok(ConnectionHandle::connected(session))
    }

    /// Dial with the startup retry budget
    ///
    /// # Errors
    /// Returns `LoadgenError::FatalBootstrap` once every attempt has failed.
    pub async fn bootstrap(&self) -> LoadgenResult<ConnectionHandle> {
        let attempts = self.policy.bootstrap_attempts;
        let mut last_error = String::from("no attempt made");

        tracing::info!(
            role = self.role,
            endpoint = %self.connector.endpoint(),
            "Waiting for database connection..."
        );

        for attempt in 1..=attempts {
            match self.connect().await {
                Ok(handle) => {
                    tracing::info!(role = self.role, attempt, "Connected to database");
                    return Ok(handle);
                }
                Err(e) => {
                    tracing::debug!(
                        role = self.role,
                        attempt,
                        max_attempts = attempts,
                        error = %e,
                        "Connection attempt failed"
                    );
                    last_error = e.to_string();
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.policy.bootstrap_delay).await;
            }
        }

        Err(LoadgenError::FatalBootstrap {
            attempts,
            last_error,
        })
    }

    /// Make sure the handle carries a usable session
    ///
    /// A Connected handle is pinged first. On a failed ping, or when the
    /// handle is already Broken or Disconnected, the stale session is dropped
    /// and up to `redial_attempts` fresh dials are made. On success the
    /// handle holds a new session; on failure it is left Disconnected.
    pub async fn ensure_alive(&self, handle: &mut ConnectionHandle) -> LoadgenResult<()> {
        if let Some(session) = handle.session_mut() {
            match session.ping().await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(role = self.role, error = %e, "Connection lost, reconnecting...");
                    handle.mark_broken();
                }
            }
        } else if handle.state() == ConnectionState::Broken {
            tracing::warn!(role = self.role, "Discarding broken connection, reconnecting...");
        }

        // Never hand the stale session back out
        drop(handle.detach());

        let attempts = self.policy.redial_attempts;
        let mut last_error = String::from("no attempt made");

        for attempt in 1..=attempts {
            match self.connector.dial().await {
                Ok(session) => {
                    handle.attach(session);
                    tracing::info!(
                        role = self.role,
                        attempt,
                        generation = handle.generation(),
                        "Reconnected"
                    );
                    return Ok(());
                }
                Err(e) => {
                    tracing::debug!(role = self.role, attempt, error = %e, "Redial failed");
                    last_error = e.to_string();
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.policy.redial_delay).await;
            }
        }

        Err(LoadgenError::connect(format!(
            "reconnect failed after {attempts} attempts: {last_error}"
        )))
    }

    /// Close the handle's session, if any
    ///
    /// Close errors are logged and swallowed; the handle ends Disconnected.
    pub async fn close(&self, handle: &mut ConnectionHandle) {
        let state = handle.state();
        if let Some(mut session) = handle.detach() {
            // A broken session is dropped rather than closed gracefully
            if state == ConnectionState::Connected {
                if let Err(e) = session.close().await {
                    tracing::debug!(role = self.role, error = %e, "Error closing connection");
                }
            }
        }
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("endpoint", &self.connector.endpoint())
            .field("role", &self.role)
            .field("policy", &self.policy)
            .finish()
    }
}
