//! Reconnect policy

use crate::error::ConfigError;
use std::time::Duration;

/// Bounds on dialing during startup and mid-run recovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Dial attempts before startup is declared failed
    pub bootstrap_attempts: u32,

    /// Pause between startup attempts
    pub bootstrap_delay: Duration,

    /// Immediate redial attempts after a failed liveness check
    pub redial_attempts: u32,

    /// Pause between redial attempts
    pub redial_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            bootstrap_attempts: 60,
            bootstrap_delay: Duration::from_secs(2),
            redial_attempts: 3,
            redial_delay: Duration::from_secs(1),
        }
    }
}

impl ReconnectPolicy {
    /// Set startup attempts and delay
    pub fn with_bootstrap(mut self, attempts: u32, delay: Duration) -> Self {
        self.bootstrap_attempts = attempts;
        self.bootstrap_delay = delay;
        self
    }

    /// Set mid-run redial attempts and delay
    pub fn with_redial(mut self, attempts: u32, delay: Duration) -> Self {
        self.redial_attempts = attempts;
        self.redial_delay = delay;
        self
    }

    /// Validate the policy
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bootstrap_attempts == 0 {
            return Err(ConfigError::InvalidSetting(
                "bootstrap attempts must be at least 1".into(),
            ));
        }
        if self.redial_attempts == 0 {
            return Err(ConfigError::InvalidSetting(
                "redial attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
