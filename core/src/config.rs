//! Traffic and connection configuration

use crate::catalog::Tier;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Default location of the traffic configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/app/config.yml";

/// Traffic shaping configuration
///
/// Loaded once at startup and immutable thereafter. Keys missing from the
/// file keep their defaults; `tier_weights` is replaced as a whole when
/// present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    /// Target requests per second
    pub base_rate: f64,

    /// Jitter fraction applied to the request interval, in [0, 1)
    pub rate_jitter: f64,

    /// Relative selection weight per tier; need not sum to 1
    #[serde(alias = "query_weights")]
    pub tier_weights: BTreeMap<Tier, f64>,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            base_rate: 5.0,
            rate_jitter: 0.2,
            tier_weights: BTreeMap::from([
                (Tier::Light, 0.5),
                (Tier::Medium, 0.3),
                (Tier::Heavy, 0.2),
            ]),
        }
    }
}

impl TrafficConfig {
    /// Set the base rate (requests per second)
    pub fn with_base_rate(mut self, rps: f64) -> Self {
        self.base_rate = rps;
        self
    }

    /// Set the jitter fraction
    pub fn with_rate_jitter(mut self, jitter: f64) -> Self {
        self.rate_jitter = jitter;
        self
    }

    /// Replace all tier weights
    pub fn with_tier_weights(mut self, weights: impl IntoIterator<Item = (Tier, f64)>) -> Self {
        self.tier_weights = weights.into_iter().collect();
        self
    }

    /// Weight configured for a tier (0 when absent)
    pub fn weight(&self, tier: Tier) -> f64 {
        self.tier_weights.get(&tier).copied().unwrap_or(0.0)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_rate.is_finite() || self.base_rate <= 0.0 {
            return Err(ConfigError::InvalidRate(format!(
                "base_rate must be positive, got {}",
                self.base_rate
            )));
        }

        if !(0.0..1.0).contains(&self.rate_jitter) {
            return Err(ConfigError::InvalidJitter(format!(
                "rate_jitter must be in [0, 1), got {}",
                self.rate_jitter
            )));
        }

        for (tier, weight) in &self.tier_weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ConfigError::InvalidWeights(format!(
                    "weight for {tier} must be a non-negative number, got {weight}"
                )));
            }
        }

        let sum: f64 = self.tier_weights.values().sum();
        if sum <= 0.0 {
            return Err(ConfigError::InvalidWeights(format!(
                "weights must sum to a positive value, got {sum}"
            )));
        }

        Ok(())
    }

    /// Parse a configuration document without validating it
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not to an empty map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Load configuration from a file, falling back to defaults
    ///
    /// A missing or unreadable file and a document that does not parse are
    /// not errors: they are logged and the defaults are used. Values that
    /// parse but do not validate are rejected.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let config = match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Error reading config, using defaults"
                    );
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %path.display(),
                    "Config file not found, using defaults"
                );
                Self::default()
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Error reading config, using defaults"
                );
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }
}

/// Parameters for dialing the database endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Router host name or address
    pub host: String,

    /// Router MySQL-protocol port
    pub port: u16,

    /// Database user
    pub user: String,

    /// Database password
    pub password: String,

    /// Default schema
    pub database: String,

    /// Upper bound on a single dial
    pub connect_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "proxysql".to_string(),
            port: 6033,
            user: "app_user".to_string(),
            password: "app_password".to_string(),
            database: "company".to_string(),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl ConnectionConfig {
    /// Validate the connection parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidSetting("host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidSetting("port must not be 0".into()));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidSetting(
                "connect timeout must be positive".into(),
            ));
        }
        Ok(())
    }

    /// `host:port` for log output
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
