#![deny(warnings, rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_possible_truncation, // Durations and byte counts stay far below u64::MAX
    clippy::missing_errors_doc,       // Error enums are documented at their definition
    clippy::missing_panics_doc,       // Non-test code does not panic
    clippy::module_name_repetitions,  // e.g. BufferError in buffer module
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown
)]

//! Buffered, batched, gzip-compressed direct ingestion of metrics,
//! histograms and tracing spans over HTTPS.

pub mod app;
pub mod buffer;
pub mod direct;
pub mod domain;
pub mod encoding;
pub mod scheduler;
pub mod sender;

// Re-export main types for easy access
pub use app::{ClientConfig, ConfigError};
pub use direct::{ClientError, DirectIngestionClient};
pub use domain::{DataType, EncodedPoint};
pub use sender::{Delivery, HttpTransport, Transport, TransportError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
