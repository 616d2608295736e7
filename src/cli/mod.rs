//! CLI argument parsing and process wiring

use anyhow::{Context, Result};
use clap::Parser;
use failover_loadgen_core::{
    ConnectionConfig, ConnectionManager, Connector, DriverBuilder, MySqlConnector, ProbeWorker,
    TrafficConfig, DEFAULT_CONFIG_PATH,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Synthetic read-traffic generator for database router failover drills
#[derive(Parser, Debug)]
#[command(name = "failover-loadgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Traffic configuration file (YAML)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Router host
    #[arg(long, env = "PROXYSQL_HOST", default_value = "proxysql")]
    pub host: String,

    /// Router MySQL-protocol port
    #[arg(long, env = "PROXYSQL_PORT", default_value_t = 6033)]
    pub port: u16,

    /// Database user
    #[arg(short, long, env = "MYSQL_USER", default_value = "app_user")]
    pub user: String,

    /// Database password
    #[arg(long, env = "MYSQL_PASSWORD", default_value = "app_password", hide_env_values = true)]
    pub password: String,

    /// Database schema
    #[arg(short, long, env = "MYSQL_DATABASE", default_value = "company")]
    pub database: String,

    /// Per-dial connect timeout in seconds
    #[arg(long, env = "CONNECT_TIMEOUT_SECS", default_value_t = 5)]
    pub connect_timeout_secs: u64,

    /// Seconds between read-only probe cycles
    #[arg(long, default_value_t = 10)]
    pub probe_interval_secs: u64,

    /// Disable the read-only probe
    #[arg(long)]
    pub no_probe: bool,

    /// Executions between periodic stats summaries
    #[arg(long, default_value_t = 50)]
    pub summary_every: u64,

    /// Per-statement timeout in seconds (0 disables it)
    #[arg(long, default_value_t = 30)]
    pub statement_timeout_secs: u64,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }

    fn statement_timeout(&self) -> Option<Duration> {
        (self.statement_timeout_secs > 0).then(|| Duration::from_secs(self.statement_timeout_secs))
    }

    /// Run until interrupted
    pub async fn run(self) -> Result<()> {
        let traffic = TrafficConfig::load(&self.config)
            .with_context(|| format!("invalid traffic configuration in {}", self.config.display()))?;

        let connection = self.connection_config();
        connection
            .validate()
            .context("invalid connection parameters")?;

        tracing::info!(
            endpoint = %connection.endpoint(),
            database = %connection.database,
            base_rate = traffic.base_rate,
            rate_jitter = traffic.rate_jitter,
            weights = ?traffic.tier_weights,
            "Load generator starting"
        );

        let connector: Arc<dyn Connector> = Arc::new(MySqlConnector::new(connection));

        let mut builder = DriverBuilder::new()
            .traffic(traffic)
            .manager(ConnectionManager::new(Arc::clone(&connector), "driver"))
            .summary_every(self.summary_every)
            .statement_timeout(self.statement_timeout());

        if self.no_probe {
            tracing::info!("Read replica probe disabled");
        } else {
            builder = builder.probe(
                ProbeWorker::new(ConnectionManager::new(connector, "probe"))
                    .with_interval(Duration::from_secs(self.probe_interval_secs))
                    .with_statement_timeout(self.statement_timeout()),
            );
        }

        let mut driver = builder.build().context("failed to build driver")?;

        match driver.run(shutdown_signal()).await {
            Ok(stats) => {
                tracing::info!(total = stats.total, rows = stats.rows, "Load generator stopped");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Load generator failed");
                Err(e.into())
            }
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining...");
}
