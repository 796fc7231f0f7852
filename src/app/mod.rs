pub mod cli;
pub mod config;
pub mod logging_system;

pub use cli::Cli;
pub use config::{ClientConfig, ConfigError, LogLevel};
pub use logging_system::{LoggingSystem, setup_logging};
