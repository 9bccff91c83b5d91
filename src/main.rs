//! broker-failover
//!
//! Connects to a primary broker and fails over to a list of backup brokers,
//! reconnecting with exponential backoff until stopped.
//!
//! ```text
//! broker-failover amqp://broker-a:5672 amqp://broker-b:5672 amqp://broker-c:5672
//! broker-failover --config client.toml
//! ```

use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use uuid::Uuid;

use broker_failover::config::validation::validate_config;
use broker_failover::config::{load_config, ClientConfig, ConfigError};
use broker_failover::lifecycle::signals::shutdown_on_signal;
use broker_failover::observability::{logging, metrics, MetricsObserver};
use broker_failover::supervisor::{run as run_supervisor, LoggingObserver};
use broker_failover::{ConnectionObserver, Endpoint, Shutdown, Supervisor, TcpTransport};

#[derive(Parser, Debug)]
#[command(name = "broker-failover")]
#[command(about = "Connect to a primary broker, failing over to backups", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Primary broker URL (overrides the configuration file).
    primary: Option<String>,

    /// Failover broker URLs, in priority order.
    failover: Vec<String>,

    /// Give up after this many consecutive failed attempts.
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Connect timeout in seconds.
    #[arg(long, value_name = "SECS")]
    connect_timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    dump_config: bool,
}

impl Cli {
    fn apply(&self, config: &mut ClientConfig) {
        if let Some(primary) = &self.primary {
            config.endpoints.primary = primary.clone();
            config.endpoints.failover = self.failover.clone();
        }
        if self.max_attempts.is_some() {
            config.reconnect.max_attempts = self.max_attempts;
        }
        if let Some(secs) = self.connect_timeout {
            config.timeouts.connect_secs = secs;
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
    }
}

/// Prints the connection banner, on stdout unless told otherwise.
struct ConsoleObserver<W = io::Stdout> {
    out: W,
}

impl ConsoleObserver {
    fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConnectionObserver for ConsoleObserver<W> {
    fn on_connected(&mut self, endpoint: &Endpoint) {
        if let Err(e) = writeln!(self.out, "Connected to {}", endpoint) {
            tracing::warn!(error = %e, "Failed to write connection banner");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    let container_id = config
        .container_id
        .get_or_insert_with(|| Uuid::new_v4().to_string())
        .clone();

    if cli.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        container = %container_id,
        primary = %config.endpoints.primary,
        failover = config.endpoints.failover.len(),
        max_attempts = ?config.reconnect.max_attempts,
        connect_timeout_secs = config.timeouts.connect_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let observer = (
        LoggingObserver::new(container_id),
        (MetricsObserver, ConsoleObserver::stdout()),
    );
    let mut supervisor = Supervisor::from_config(&config, observer)?;

    let shutdown = Arc::new(Shutdown::new());
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = shutdown_on_signal(&signal_shutdown).await {
            tracing::error!(error = %e, "Failed to install signal handlers");
        }
    });

    let transport = TcpTransport::new();
    run_supervisor(&mut supervisor, &transport, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
