//! Single-statement execution with error-as-value results

use crate::catalog::ParamValue;
use crate::connection::ConnectionHandle;

use std::time::{Duration, Instant};

/// Outcome of one statement execution
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    /// Whether the statement completed and its rows were read
    pub success: bool,

    /// Wall time spent, up to the point of failure on error
    pub duration: Duration,

    /// Rows read; 0 on failure
    pub row_count: usize,

    /// Failure description for log output
    pub error: Option<String>,
}

impl ExecutionResult {
    /// A successful execution
    pub fn success(duration: Duration, row_count: usize) -> Self {
        Self {
            success: true,
            duration,
            row_count,
            error: None,
        }
    }

    /// A failed execution
    pub fn failure(duration: Duration, error: impl Into<String>) -> Self {
        Self {
            success: false,
            duration,
            row_count: 0,
            error: Some(error.into()),
        }
    }

    /// Duration in milliseconds
    pub fn duration_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1000.0
    }
}

/// Runs statements on a connection handle
///
/// Never fails: faults become a failed [`ExecutionResult`] and the handle is
/// marked Broken so that the owner re-establishes it before the next use.
#[derive(Debug, Clone, Default)]
pub struct QueryExecutor {
    timeout: Option<Duration>,
}

impl QueryExecutor {
    /// Executor without a statement deadline
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound each statement by a deadline
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured statement deadline
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Execute one statement and read all of its rows
    pub async fn execute(
        &self,
        handle: &mut ConnectionHandle,
        statement: &str,
        params: &[ParamValue],
    ) -> ExecutionResult {
        let start = Instant::now();
        let state = handle.state();

        let Some(session) = handle.session_mut() else {
            return ExecutionResult::failure(
                start.elapsed(),
                format!("connection not usable ({state:?})"),
            );
        };

        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, session.query(statement, params)).await
            {
                Ok(outcome) => outcome.map_err(|e| e.to_string()),
                Err(_) => Err(format!("statement timed out after {limit:?}")),
            },
            None => session
                .query(statement, params)
                .await
                .map_err(|e| e.to_string()),
        };

        let duration = start.elapsed();
        match outcome {
            Ok(rows) => ExecutionResult::success(duration, rows),
            Err(error) => {
                handle.mark_broken();
                ExecutionResult::failure(duration, error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::mock::MockConnector;
    use crate::connection::{ConnectionManager, ConnectionState, ReconnectPolicy};
    use std::sync::Arc;

    async fn connected(connector: &MockConnector) -> (ConnectionManager, ConnectionHandle) {
        let manager = ConnectionManager::new(Arc::new(connector.clone()), "test")
            .with_policy(ReconnectPolicy::default().with_redial(1, Duration::ZERO));
        let handle = manager.connect().await.unwrap();
        (manager, handle)
    }

    #[tokio::test]
    async fn test_successful_execution() {
        let connector = MockConnector::new().with_rows(12);
        let (_, mut handle) = connected(&connector).await;

        let result = QueryExecutor::new()
            .execute(&mut handle, "SELECT 1", &[])
            .await;

        assert!(result.success);
        assert_eq!(result.row_count, 12);
        assert!(result.error.is_none());
        assert!(handle.is_connected());
    }

    #[tokio::test]
    async fn test_failure_is_a_value_and_breaks_handle() {
        let connector = MockConnector::new().with_queries([false]);
        let (_, mut handle) = connected(&connector).await;

        let result = QueryExecutor::new()
            .execute(&mut handle, "SELECT * FROM employees WHERE emp_id = ?", &[ParamValue::Int(4)])
            .await;

        assert!(!result.success);
        assert_eq!(result.row_count, 0);
        assert!(result.error.is_some());
        assert_eq!(handle.state(), ConnectionState::Broken);
    }

    #[tokio::test]
    async fn test_broken_handle_not_reused_until_ensure_alive() {
        let connector = MockConnector::new().with_queries([false]);
        let (manager, mut handle) = connected(&connector).await;
        let executor = QueryExecutor::new();

        executor.execute(&mut handle, "SELECT 1", &[]).await;
        assert_eq!(connector.state().queries(), 1);

        // The broken session must not see another statement
        let result = executor.execute(&mut handle, "SELECT 2", &[]).await;
        assert!(!result.success);
        assert_eq!(connector.state().queries(), 1);

        manager.ensure_alive(&mut handle).await.unwrap();
        let result = executor.execute(&mut handle, "SELECT 3", &[]).await;
        assert!(result.success);

        let statements = connector.state().statements();
        assert_eq!(statements.len(), 2);
        assert_ne!(statements[0].0, statements[1].0, "must run on a fresh session");
    }

    #[tokio::test]
    async fn test_disconnected_handle_fails_fast() {
        let mut handle = ConnectionHandle::disconnected();
        let result = QueryExecutor::new().execute(&mut handle, "SELECT 1", &[]).await;
        assert!(!result.success);
        assert_eq!(result.row_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_statement_timeout() {
        let connector = MockConnector::new().with_query_delay(Duration::from_secs(60));
        let (_, mut handle) = connected(&connector).await;

        let result = QueryExecutor::new()
            .with_timeout(Some(Duration::from_secs(5)))
            .execute(&mut handle, "SELECT SLEEP(60)", &[])
            .await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("timed out"));
        assert_eq!(handle.state(), ConnectionState::Broken);
    }
}
