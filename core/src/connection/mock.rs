//! Scripted in-memory connector for tests

use super::traits::{Connector, Session};
use crate::catalog::ParamValue;
use crate::error::{LoadgenError, LoadgenResult};

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Counters and scripts shared by a connector and all its sessions
#[derive(Default)]
pub(crate) struct MockState {
    pub dials: AtomicUsize,
    pub pings: AtomicUsize,
    pub queries: AtomicUsize,
    pub closes: AtomicUsize,
    dial_script: Mutex<VecDeque<bool>>,
    ping_script: Mutex<VecDeque<bool>>,
    query_script: Mutex<VecDeque<bool>>,
    statements: Mutex<Vec<(usize, String)>>,
    query_delay: Mutex<Option<Duration>>,
    rows: AtomicUsize,
}

impl MockState {
    fn next(script: &Mutex<VecDeque<bool>>) -> bool {
        script.lock().unwrap().pop_front().unwrap_or(true)
    }

    pub fn dials(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }

    pub fn pings(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// `(session id, statement)` for every query that reached a session
    pub fn statements(&self) -> Vec<(usize, String)> {
        self.statements.lock().unwrap().clone()
    }
}

/// Connector whose outcomes follow per-operation scripts
///
/// Each script is consumed front to back; once empty every operation
/// succeeds.
#[derive(Clone)]
pub(crate) struct MockConnector {
    state: Arc<MockState>,
}

impl MockConnector {
    pub fn new() -> Self {
        let state = MockState::default();
        state.rows.store(3, Ordering::SeqCst);
        Self {
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> Arc<MockState> {
        Arc::clone(&self.state)
    }

    /// Queue dial outcomes (`true` = success)
    pub fn with_dials(self, outcomes: impl IntoIterator<Item = bool>) -> Self {
        self.state.dial_script.lock().unwrap().extend(outcomes);
        self
    }

    /// Make the next `n` dials fail
    pub fn failing_dials(self, n: usize) -> Self {
        self.with_dials(std::iter::repeat(false).take(n))
    }

    /// Queue ping outcomes (`true` = success)
    pub fn with_pings(self, outcomes: impl IntoIterator<Item = bool>) -> Self {
        self.state.ping_script.lock().unwrap().extend(outcomes);
        self
    }

    /// Queue query outcomes (`true` = success)
    pub fn with_queries(self, outcomes: impl IntoIterator<Item = bool>) -> Self {
        self.state.query_script.lock().unwrap().extend(outcomes);
        self
    }

    /// Delay every query
    pub fn with_query_delay(self, delay: Duration) -> Self {
        *self.state.query_delay.lock().unwrap() = Some(delay);
        self
    }

    /// Rows returned by successful queries
    pub fn with_rows(self, rows: usize) -> Self {
        self.state.rows.store(rows, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl Connector for MockConnector {
    fn endpoint(&self) -> String {
        "mock:6033".to_string()
    }

    async fn dial(&self) -> LoadgenResult<Box<dyn Session>> {
        let id = self.state.dials.fetch_add(1, Ordering::SeqCst) + 1;
        if MockState::next(&self.state.dial_script) {
            Ok(Box::new(MockSession {
                id,
                state: Arc::clone(&self.state),
            }))
        } else {
            Err(LoadgenError::connect("connection refused"))
        }
    }
}

pub(crate) struct MockSession {
    id: usize,
    state: Arc<MockState>,
}

#[async_trait]
impl Session for MockSession {
    async fn ping(&mut self) -> LoadgenResult<()> {
        self.state.pings.fetch_add(1, Ordering::SeqCst);
        if MockState::next(&self.state.ping_script) {
            Ok(())
        } else {
            Err(LoadgenError::connect("server has gone away"))
        }
    }

    async fn query(&mut self, statement: &str, _params: &[ParamValue]) -> LoadgenResult<usize> {
        self.state.queries.fetch_add(1, Ordering::SeqCst);
        self.state
            .statements
            .lock()
            .unwrap()
            .push((self.id, statement.to_string()));

        let delay = *self.state.query_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if MockState::next(&self.state.query_script) {
            Ok(self.state.rows.load(Ordering::SeqCst))
        } else {
            Err(LoadgenError::execution("lost connection during query"))
        }
    }

    async fn close(&mut self) -> LoadgenResult<()> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
