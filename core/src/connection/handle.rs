//! Logical connection handle

use super::traits::Session;

/// Lifecycle state of a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session attached
    Disconnected,
    /// Session attached and believed healthy
    Connected,
    /// Session attached but a fault was observed; must not be reused
    Broken,
}

/// A single logical connection owned by one component
///
/// The underlying session is replaced on every successful (re)dial; the
/// `generation` counter increments each time so callers can tell a fresh
/// session from the one they used before.
pub struct ConnectionHandle {
    session: Option<Box<dyn Session>>,
    state: ConnectionState,
    generation: u64,
}

impl ConnectionHandle {
    /// A handle with no session attached
    pub fn disconnected() -> Self {
        Self {
            session: None,
            state: ConnectionState::Disconnected,
            generation: 0,
        }
    }

    pub(crate) fn connected(session: Box<dyn Session>) -> Self {
        let mut handle = Self::disconnected();
        handle.attach(session);
        handle
    }

    /// Current state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether the handle may be used for execution
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Number of sessions attached over the handle's lifetime
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record a fault; the session will be discarded before the next use
    pub fn mark_broken(&mut self) {
        if self.session.is_some() {
            self.state = ConnectionState::Broken;
        }
    }

    /// Session for execution, only while Connected
    pub(crate) fn session_mut(&mut self) -> Option<&mut (dyn Session + 'static)> {
        match self.state {
            ConnectionState::Connected => self.session.as_deref_mut(),
            _ => None,
        }
    }

    pub(crate) fn attach(&mut self, session: Box<dyn Session>) {
        self.session = Some(session);
        self.state = ConnectionState::Connected;
        self.generation += 1;
    }

    /// Detach the session, leaving the handle Disconnected
    pub(crate) fn detach(&mut self) -> Option<Box<dyn Session>> {
        self.state = ConnectionState::Disconnected;
        self.session.take()
    }
}

impl Default for ConnectionHandle {
    fn default() -> Self {
        Self::disconnected()
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .finish()
    }
}
