mod error;

pub use error::ClientError;

use crate::app::ClientConfig;
use crate::buffer::BufferSet;
use crate::domain::{DataType, EncodedPoint};
use crate::scheduler::{FlushScheduler, flush_buffers};
use crate::sender::{
    BatchTransmitter, HttpTransport, SenderStats, TransmissionReport, Transport,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::info;

/// Direct ingestion client.
///
/// `send_*` enqueue into a per-type buffer that a background task flushes every
/// `flush_interval`; `send_*s_now` skip the buffer and post on the caller's
/// task. Share it between tasks behind an `Arc`.
///
/// ```no_run
/// # async fn demo() -> Result<(), wavefront_sender::ClientError> {
/// use wavefront_sender::{ClientConfig, DirectIngestionClient};
///
/// let config = ClientConfig::new("https://example.wavefront.com", "my-token");
/// let client = DirectIngestionClient::new(config)?;
/// client.send_metric("\"requests\" 1 source=\"web-1\"").await?;
/// client.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct DirectIngestionClient<T: Transport = HttpTransport> {
    config: ClientConfig,
    buffers: Arc<BufferSet>,
    transmitter: Arc<BatchTransmitter<T>>,
    stats: Arc<SenderStats>,
    scheduler: Mutex<FlushScheduler<T>>,
    closed: AtomicBool,
}

impl DirectIngestionClient<HttpTransport> {
    /// Validate `config`, build the HTTPS transport and start flushing.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> DirectIngestionClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, ClientError> {
        config.validate()?;

        let buffers = Arc::new(BufferSet::new(config.max_queue_size)?);
        let stats = Arc::new(SenderStats::new());
        let transmitter = Arc::new(BatchTransmitter::new(
            Arc::new(transport),
            config.batch_size,
            stats.clone(),
        ));

        let mut scheduler =
            FlushScheduler::new(buffers.clone(), transmitter.clone(), config.flush_interval);
        scheduler.start()?;

        info!(
            "Direct ingestion client ready (server={}, max_queue_size={}, batch_size={})",
            config.server, config.max_queue_size, config.batch_size
        );

        Ok(Self {
            config,
            buffers,
            transmitter,
            stats,
            scheduler: Mutex::new(scheduler),
            closed: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn stats(&self) -> &SenderStats {
        &self.stats
    }

    /// Rejected batches plus transport failures so far.
    pub fn failure_count(&self) -> u64 {
        self.stats.failure_count()
    }

    pub fn buffered_len(&self, data_type: DataType) -> usize {
        self.buffers.get(data_type).len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn transport(&self) -> &T {
        self.transmitter.transport()
    }

    /// Enqueue one point, waiting while its buffer is full.
    ///
    /// Returns [`ClientError::Closed`] if the client shuts down before the
    /// point was accepted; an accepted point is always part of a flush.
    pub async fn send(
        &self,
        data_type: DataType,
        point: impl Into<EncodedPoint>,
    ) -> Result<(), ClientError> {
        self.ensure_open()?;
        self.buffers
            .get(data_type)
            .push(point.into())
            .await
            .map_err(|_| ClientError::Closed)?;
        self.stats.record_enqueued(data_type);
        Ok(())
    }

    pub async fn send_metric(&self, point: impl Into<EncodedPoint>) -> Result<(), ClientError> {
        self.send(DataType::Metric, point).await
    }

    pub async fn send_histogram(&self, point: impl Into<EncodedPoint>) -> Result<(), ClientError> {
        self.send(DataType::Histogram, point).await
    }

    pub async fn send_span(&self, point: impl Into<EncodedPoint>) -> Result<(), ClientError> {
        self.send(DataType::Span, point).await
    }

    /// Send `points` immediately, bypassing the buffer.
    ///
    /// Every batch is attempted; if any could not be delivered at all the first
    /// transport error is returned. Batches the endpoint rejected are counted in
    /// the report, not returned as errors.
    pub async fn send_now<I, P>(
        &self,
        data_type: DataType,
        points: I,
    ) -> Result<TransmissionReport, ClientError>
    where
        I: IntoIterator<Item = P>,
        P: Into<EncodedPoint>,
    {
        self.ensure_open()?;
        let points: Vec<EncodedPoint> = points.into_iter().map(Into::into).collect();
        let report = self.transmitter.transmit(data_type, points).await;
        Ok(report.into_result()?)
    }

    pub async fn send_metrics_now<I, P>(&self, points: I) -> Result<TransmissionReport, ClientError>
    where
        I: IntoIterator<Item = P>,
        P: Into<EncodedPoint>,
    {
        self.send_now(DataType::Metric, points).await
    }

    pub async fn send_histograms_now<I, P>(
        &self,
        points: I,
    ) -> Result<TransmissionReport, ClientError>
    where
        I: IntoIterator<Item = P>,
        P: Into<EncodedPoint>,
    {
        self.send_now(DataType::Histogram, points).await
    }

    pub async fn send_spans_now<I, P>(&self, points: I) -> Result<TransmissionReport, ClientError>
    where
        I: IntoIterator<Item = P>,
        P: Into<EncodedPoint>,
    {
        self.send_now(DataType::Span, points).await
    }

    /// Drain and send every buffer on the caller's task, without waiting for
    /// the next tick.
    pub async fn flush_now(&self) -> Result<Vec<(DataType, TransmissionReport)>, ClientError> {
        self.ensure_open()?;
        Ok(flush_buffers(&self.buffers, &self.transmitter).await)
    }

    /// Stop the flush task after one final drain-and-flush of every buffer.
    ///
    /// Calling it a second time returns [`ClientError::Closed`].
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(ClientError::Closed);
        }

        info!("Shutting down direct ingestion client");
        // Close first: waiting producers are refused, and the final flush sees
        // every point that was accepted.
        self.buffers.close_all();
        self.scheduler.lock().await.stop().await?;

        let total = self.stats.total();
        info!(
            "Direct ingestion client closed: {} points sent, {} failed batches",
            total.points_sent,
            total.failures()
        );
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), ClientError> {
        if self.is_closed() {
            Err(ClientError::Closed)
        } else {
            Ok(())
        }
    }
}

impl<T: Transport> std::fmt::Debug for DirectIngestionClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectIngestionClient")
            .field("server", &self.config.server)
            .field("buffers", &self.buffers)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
