//! One-shot shutdown signal shared between the driver loop and the probe

use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Single-writer side of the shutdown flag
///
/// Only the holder of the signal can set it; every [`ShutdownListener`]
/// handed out observes the same flag. Setting it more than once is a no-op.
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    token: CancellationToken,
}

impl ShutdownSignal {
    /// Create an unset signal
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag, waking every listener
    pub fn trigger(&self) {
        self.token.cancel();
    }

    /// Whether the flag has been set
    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Read-only handle for another task
    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener {
            token: self.token.child_token(),
        }
    }
}

/// Read side of the shutdown flag
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    token: CancellationToken,
}

impl ShutdownListener {
    /// Whether shutdown has been requested
    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Sleep for `duration` unless shutdown is requested first
    ///
    /// Returns `true` if the sleep was cut short by shutdown.
    pub async fn sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => true,
            _ = tokio::time::sleep(duration) => false,
        }
    }
}
