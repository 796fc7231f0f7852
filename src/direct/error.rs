use crate::app::ConfigError;
use crate::buffer::BufferError;
use crate::scheduler::SchedulerError;
use crate::sender::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Buffer error: {0}")]
    Buffer(#[from] BufferError),
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
    #[error("Client is closed")]
    Closed,
}
