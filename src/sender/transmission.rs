use super::client::{Delivery, Transport, TransportError};
use super::compression::compress_batch;
use super::stats::SenderStats;
use crate::buffer::{Batch, split_into_batches};
use crate::domain::{DataType, EncodedPoint};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Outcome of pushing one sequence of points through split → gzip → send.
#[derive(Debug, Default)]
pub struct TransmissionReport {
    pub points: usize,
    pub batches_accepted: usize,
    pub batches_rejected: usize,
    /// Transport failures, in the order the batches were attempted.
    pub errors: Vec<TransportError>,
}

impl TransmissionReport {
    pub fn batches(&self) -> usize {
        self.batches_accepted + self.batches_rejected + self.errors.len()
    }

    /// True when every batch was accepted.
    pub fn is_clean(&self) -> bool {
        self.batches_rejected == 0 && self.errors.is_empty()
    }

    /// Surface the first transport failure, if any. Rejected batches are not
    /// errors here.
    pub fn into_result(mut self) -> Result<Self, TransportError> {
        if self.errors.is_empty() {
            Ok(self)
        } else {
            Err(self.errors.remove(0))
        }
    }
}

/// Splits points into batches and sends each one independently.
///
/// A failed batch never stops the remaining batches of the same call.
pub struct BatchTransmitter<T: Transport> {
    transport: Arc<T>,
    batch_size: usize,
    stats: Arc<SenderStats>,
}

impl<T: Transport> BatchTransmitter<T> {
    pub fn new(transport: Arc<T>, batch_size: usize, stats: Arc<SenderStats>) -> Self {
        Self {
            transport,
            batch_size,
            stats,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn stats(&self) -> &SenderStats {
        &self.stats
    }

    pub async fn transmit(
        &self,
        data_type: DataType,
        points: Vec<EncodedPoint>,
    ) -> TransmissionReport {
        let mut report = TransmissionReport {
            points: points.len(),
            ..Default::default()
        };

        for batch in split_into_batches(points, self.batch_size) {
            match self.send_batch(data_type, &batch).await {
                Ok(Delivery::Accepted { .. }) => report.batches_accepted += 1,
                Ok(Delivery::Rejected { status }) => {
                    warn!(
                        "Dropping {} batch {} ({} points) after HTTP {}",
                        data_type,
                        batch.id(),
                        batch.size(),
                        status
                    );
                    report.batches_rejected += 1;
                }
                Err(e) => {
                    error!(
                        "Failed to send {} batch {} ({} points): {}",
                        data_type,
                        batch.id(),
                        batch.size(),
                        e
                    );
                    self.stats.record_transport_error(data_type);
                    report.errors.push(e);
                }
            }
        }

        report
    }

    pub async fn send_batch(
        &self,
        data_type: DataType,
        batch: &Batch,
    ) -> Result<Delivery, TransportError> {
        let payload = compress_batch(batch)?;
        let bytes = payload.len();

        debug!(
            "Sending {} batch {} with {} points ({} bytes compressed)",
            data_type,
            batch.id(),
            batch.size(),
            bytes
        );

        let delivery = self.transport.send(Bytes::from(payload), data_type).await?;
        match delivery {
            Delivery::Accepted { .. } => {
                self.stats.record_accepted(data_type, batch.size(), bytes);
            }
            Delivery::Rejected { .. } => self.stats.record_rejected(data_type, bytes),
        }

        Ok(delivery)
    }
}

impl<T: Transport> std::fmt::Debug for BatchTransmitter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchTransmitter")
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}
