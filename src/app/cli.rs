use super::config::{ClientConfig, ConfigError, LogLevel};
use super::logging_system::setup_logging;
use crate::direct::DirectIngestionClient;
use crate::domain::{DataType, EncodedPoint};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Send line-data read from stdin to a Wavefront direct ingestion endpoint.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Ingestion server base URL
    #[arg(long, env = "WAVEFRONT_SERVER")]
    pub server: Option<String>,

    /// API token
    #[arg(long, env = "WAVEFRONT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// TOML configuration file; flags override its values
    #[arg(long, env = "WAVEFRONT_CONFIG")]
    pub config_file: Option<PathBuf>,

    /// Kind of data on stdin
    #[arg(long, value_enum, default_value = "metric")]
    pub data_type: DataType,

    /// Points per request
    #[arg(long, env = "WAVEFRONT_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Capacity of each buffer
    #[arg(long, env = "WAVEFRONT_MAX_QUEUE_SIZE")]
    pub max_queue_size: Option<usize>,

    /// Flush interval in milliseconds
    #[arg(long, env = "WAVEFRONT_FLUSH_INTERVAL_MS")]
    pub flush_interval_ms: Option<u64>,

    /// Send everything in one immediate call instead of through the buffer
    #[arg(long)]
    pub now: bool,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,
}

impl Cli {
    pub fn to_config(&self) -> Result<ClientConfig, ConfigError> {
        let mut config = match &self.config_file {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                toml::from_str::<ClientConfig>(&content)?
            }
            None => ClientConfig::default(),
        };

        if let Some(server) = &self.server {
            config.server.clone_from(server);
        }
        if let Some(token) = &self.token {
            config.token.clone_from(token);
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(max_queue_size) = self.max_queue_size {
            config.max_queue_size = max_queue_size;
        }
        if let Some(flush_interval_ms) = self.flush_interval_ms {
            config.flush_interval = Duration::from_millis(flush_interval_ms);
        }

        config.validate()?;
        Ok(config)
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    setup_logging(cli.log_level)?;
    let config = cli.to_config().context("invalid configuration")?;
    let client = DirectIngestionClient::new(config)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = Vec::new();
    let mut read = 0usize;

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        read += 1;

        if cli.now {
            pending.push(EncodedPoint::from(line));
        } else {
            client.send(cli.data_type, line).await?;
        }
    }

    if cli.now {
        let report = client.send_now(cli.data_type, pending).await?;
        info!(
            "Sent {} points in {} batches ({} rejected)",
            report.points,
            report.batches(),
            report.batches_rejected
        );
    }

    client.shutdown().await?;
    info!(
        "Read {} {} points, {} failed batches",
        read,
        cli.data_type,
        client.failure_count()
    );
    Ok(())
}
