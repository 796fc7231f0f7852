use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_MAX_QUEUE_SIZE: usize = 50_000;
pub const DEFAULT_BATCH_SIZE: usize = 10_000;
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Environment error: {0}")]
    EnvError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Settings fixed for the lifetime of a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the ingestion endpoint; reports go to `<server>/report`
    pub server: String,
    /// Bearer token sent with every report
    pub token: String,
    /// Capacity of each per-type buffer
    pub max_queue_size: usize,
    /// Maximum points per request
    pub batch_size: usize,
    #[serde(with = "duration_serde")]
    pub flush_interval: Duration,
    #[serde(with = "duration_serde")]
    pub request_timeout: Duration,
    #[serde(with = "duration_serde")]
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            token: String::new(),
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: format!("wavefront-sender/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn new(server: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            token: token.into(),
            ..Self::default()
        }
    }

    pub fn with_max_queue_size(mut self, max_queue_size: usize) -> Self {
        self.max_queue_size = max_queue_size;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_interval = flush_interval;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Defaults overridden by `WAVEFRONT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = ClientConfig::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        load_env_string("WAVEFRONT_SERVER", &mut self.server);
        load_env_string("WAVEFRONT_TOKEN", &mut self.token);
        load_env_var("WAVEFRONT_MAX_QUEUE_SIZE", &mut self.max_queue_size)?;
        load_env_var("WAVEFRONT_BATCH_SIZE", &mut self.batch_size)?;

        let mut flush_interval_ms = self.flush_interval.as_millis() as u64;
        load_env_var("WAVEFRONT_FLUSH_INTERVAL_MS", &mut flush_interval_ms)?;
        self.flush_interval = Duration::from_millis(flush_interval_ms);

        let mut request_timeout_secs = self.request_timeout.as_secs();
        load_env_var("WAVEFRONT_REQUEST_TIMEOUT_SECS", &mut request_timeout_secs)?;
        self.request_timeout = Duration::from_secs(request_timeout_secs);

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.server).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid server URL '{}': {}", self.server, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "Server URL '{}' must use http or https",
                self.server
            )));
        }

        if self.token.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "Token must not be empty".to_string(),
            ));
        }

        if self.max_queue_size == 0 {
            return Err(ConfigError::InvalidConfig(
                "max_queue_size must be greater than 0".to_string(),
            ));
        }

        if self.batch_size == 0 {
            return Err(ConfigError::InvalidConfig(
                "batch_size must be greater than 0".to_string(),
            ));
        }

        if self.flush_interval.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "flush_interval must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "Request and connect timeouts must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Helper function to load and parse an environment variable.
/// Returns Ok(()) if the variable doesn't exist (keeps default).
fn load_env_var<T>(name: &str, target: &mut T) -> Result<(), ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if let Ok(value) = std::env::var(name) {
        *target = value
            .parse()
            .map_err(|e| ConfigError::EnvError(format!("Invalid {name}: {e}")))?;
    }
    Ok(())
}

fn load_env_string(name: &str, target: &mut String) {
    if let Ok(value) = std::env::var(name) {
        *target = value;
    }
}

// Durations are written as milliseconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ClientConfig {
        ClientConfig::new("https://example.wavefront.com", "secret-token")
    }

    #[test]
    fn test_defaults() {
        let config = valid();
        assert_eq!(config.max_queue_size, 50_000);
        assert_eq!(config.batch_size, 10_000);
        assert_eq!(config.flush_interval, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        let cases = [
            valid().with_max_queue_size(0),
            valid().with_batch_size(0),
            valid().with_flush_interval(Duration::ZERO),
            valid().with_request_timeout(Duration::ZERO),
        ];
        for config in cases {
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_bad_server_rejected() {
        let config = ClientConfig::new("example.wavefront.com", "token");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));

        let config = ClientConfig::new("ftp://example.wavefront.com", "token");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_empty_token_rejected() {
        let config = ClientConfig::new("https://example.wavefront.com", "");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_toml_with_partial_fields() {
        let config = ClientConfig::from_toml_str(
            r#"
            server = "https://example.wavefront.com"
            token = "abc"
            batch_size = 500
            flush_interval = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.batch_size, 500);
        assert_eq!(config.flush_interval, Duration::from_millis(250));
        assert_eq!(config.max_queue_size, DEFAULT_MAX_QUEUE_SIZE);
    }

    #[test]
    fn test_toml_validation_applies() {
        let result = ClientConfig::from_toml_str(
            r#"
            server = "https://example.wavefront.com"
            token = "abc"
            max_queue_size = 0
            "#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }
}
