pub mod client;
pub mod compression;
pub mod stats;
pub mod transmission;

pub use client::{Delivery, HttpTransport, Transport, TransportError};
pub use compression::{compress_batch, compress_payload, decompress_payload};
pub use stats::{SenderStats, StatsSnapshot};
pub use transmission::{BatchTransmitter, TransmissionReport};
