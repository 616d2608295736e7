//! MySQL-protocol backend built on mysql_async

use super::traits::{Connector, Session};
use crate::catalog::ParamValue;
use crate::config::ConnectionConfig;
use crate::error::{LoadgenError, LoadgenResult};

use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Conn, Opts, OptsBuilder, Params, Row, Value};

/// Convert bound values to mysql_async parameters
fn to_params(params: &[ParamValue]) -> Params {
    if params.is_empty() {
        return Params::Empty;
    }
    Params::Positional(
        params
            .iter()
            .map(|param| match param {
                ParamValue::Int(n) => Value::Int(*n),
                ParamValue::Text(s) => Value::Bytes(s.as_bytes().to_vec()),
            })
            .collect(),
    )
}

/// Dials the router endpoint described by a [`ConnectionConfig`]
#[derive(Debug, Clone)]
pub struct MySqlConnector {
    config: ConnectionConfig,
}

impl MySqlConnector {
    /// Create a connector
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    fn opts(&self) -> Opts {
        OptsBuilder::default()
            .ip_or_hostname(self.config.host.clone())
            .tcp_port(self.config.port)
            .user(Some(self.config.user.clone()))
            .pass(Some(self.config.password.clone()))
            .db_name(Some(self.config.database.clone()))
            .into()
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    fn endpoint(&self) -> String {
        self.config.endpoint()
    }

    async fn dial(&self) -> LoadgenResult<Box<dyn Session>> {
        let timeout = self.config.connect_timeout;

        let conn = tokio::time::timeout(timeout, Conn::new(self.opts()))
            .await
            .map_err(|_| {
                LoadgenError::connect(format!(
                    "timed out after {:?} connecting to {}",
                    timeout,
                    self.endpoint()
                ))
            })?
            .map_err(|e| {
                LoadgenError::connect(format!("failed to connect to {}: {}", self.endpoint(), e))
            })?;

        Ok(Box::new(MySqlSession { conn: Some(conn) }))
    }
}

/// One mysql_async connection
struct MySqlSession {
    conn: Option<Conn>,
}

impl MySqlSession {
    fn conn(&mut self) -> LoadgenResult<&mut Conn> {
        self.conn
            .as_mut()
            .ok_or_else(|| LoadgenError::connect("connection already closed"))
    }
}

#[async_trait]
impl Session for MySqlSession {
    async fn ping(&mut self) -> LoadgenResult<()> {
        self.conn()?
            .ping()
            .await
            .map_err(|e| LoadgenError::connect(format!("ping failed: {e}")))
    }

    async fn query(&mut self, statement: &str, params: &[ParamValue]) -> LoadgenResult<usize> {
        let rows: Vec<Row> = self
            .conn()?
            .exec(statement, to_params(params))
            .await
            .map_err(|e| LoadgenError::execution(e.to_string()))?;
        Ok(rows.len())
    }

    async fn close(&mut self) -> LoadgenResult<()> {
        if let Some(conn) = self.conn.take() {
            conn.disconnect()
                .await
                .map_err(|e| LoadgenError::connect(format!("failed to close connection: {e}")))?;
        }
        Ok(())
    }
}
