//! Error types for failover-loadgen-core

use thiserror::Error;

/// Core error type
///
/// Query execution faults are deliberately absent from the propagating
/// paths: the executor folds them into an [`ExecutionResult`] value. Only
/// configuration problems and bootstrap exhaustion ever reach the binary.
///
/// [`ExecutionResult`]: crate::executor::ExecutionResult
#[derive(Error, Debug)]
pub enum LoadgenError {
    /// Invalid traffic or connection configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Dial, authentication or network failure
    #[error("connection error: {0}")]
    Connect(String),

    /// Statement or session failure
    #[error("execution error: {0}")]
    Execution(String),

    /// Retries exhausted before the first successful connection
    #[error("failed to connect to database after {attempts} attempts: {last_error}")]
    FatalBootstrap {
        /// Number of dial attempts made
        attempts: u32,
        /// Error reported by the final attempt
        last_error: String,
    },

    /// A builder was finalized without a required component
    #[error("missing required component: {0}")]
    MissingConfig(&'static str),
}

impl LoadgenError {
    /// Create a connection error
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect(message.into())
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Check whether this error should end the process
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::FatalBootstrap { .. } | Self::MissingConfig(_)
        )
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Tier weights that cannot form a probability distribution
    #[error("invalid tier weights: {0}")]
    InvalidWeights(String),

    /// Non-positive or non-finite request rate
    #[error("invalid base rate: {0}")]
    InvalidRate(String),

    /// Jitter fraction outside [0, 1)
    #[error("invalid rate jitter: {0}")]
    InvalidJitter(String),

    /// Bad connection or probe setting
    #[error("invalid setting: {0}")]
    InvalidSetting(String),
}

/// Result type alias
pub type LoadgenResult<T> = std::result::Result<T, LoadgenError>;
