pub mod batch;
pub mod bounded;
pub mod error;

pub use batch::{Batch, split_into_batches};
pub use bounded::{BoundedBuffer, BufferSet};
pub use error::BufferError;
