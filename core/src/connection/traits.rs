//! Driver seam for database sessions

use crate::catalog::ParamValue;
use crate::error::LoadgenResult;
use async_trait::async_trait;

/// A live session to the database endpoint
#[async_trait]
pub trait Session: Send {
    /// Cheap round trip confirming the session is usable
    async fn ping(&mut self) -> LoadgenResult<()>;

    /// Execute a statement and fully materialize its result
    ///
    /// Returns the number of rows read.
    async fn query(&mut self, statement: &str, params: &[ParamValue]) -> LoadgenResult<usize>;

    /// Close the session gracefully
    async fn close(&mut self) -> LoadgenResult<()>;
}

/// Factory for sessions against one endpoint
#[async_trait]
pub trait Connector: Send + Sync {
    /// Endpoint description for log output
    fn endpoint(&self) -> String;

    /// Open a new session
    async fn dial(&self) -> LoadgenResult<Box<dyn Session>>;
}
