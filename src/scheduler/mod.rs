use crate::buffer::BufferSet;
use crate::domain::DataType;
use crate::sender::{BatchTransmitter, TransmissionReport, Transport};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Flush scheduler already running")]
    AlreadyRunning,
    #[error("Flush scheduler already stopped")]
    AlreadyStopped,
    #[error("Flush scheduler was never started")]
    NotStarted,
    #[error("Flush task failed: {0}")]
    TaskFailed(String),
}

enum SchedulerState {
    Idle,
    Running {
        cancel: CancellationToken,
        handle: JoinHandle<()>,
    },
    Stopped,
}

/// Background task that drains every buffer once per `flush_interval`.
///
/// Lifecycle is `Idle -> Running -> Stopped`; a stopped scheduler cannot be
/// restarted. Stopping waits for an in-flight flush, then runs one final flush
/// so nothing enqueued before `stop` is left behind.
pub struct FlushScheduler<T: Transport> {
    buffers: Arc<BufferSet>,
    transmitter: Arc<BatchTransmitter<T>>,
    flush_interval: Duration,
    cycles: Arc<AtomicU64>,
    state: SchedulerState,
}

impl<T: Transport> FlushScheduler<T> {
    pub fn new(
        buffers: Arc<BufferSet>,
        transmitter: Arc<BatchTransmitter<T>>,
        flush_interval: Duration,
    ) -> Self {
        Self {
            buffers,
            transmitter,
            flush_interval,
            cycles: Arc::new(AtomicU64::new(0)),
            state: SchedulerState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SchedulerState::Running { .. })
    }

    /// Completed flush cycles, including the final one run by `stop`.
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Spawn the flush task. Must be called from within a Tokio runtime.
    pub fn start(&mut self) -> Result<(), SchedulerError> {
        match self.state {
            SchedulerState::Idle => {}
            SchedulerState::Running { .. } => return Err(SchedulerError::AlreadyRunning),
            SchedulerState::Stopped => return Err(SchedulerError::AlreadyStopped),
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_flush_loop(
            self.buffers.clone(),
            self.transmitter.clone(),
            self.flush_interval,
            self.cycles.clone(),
            cancel.clone(),
        ));

        info!(
            "Flush scheduler started (interval={:?}, batch_size={})",
            self.flush_interval,
            self.transmitter.batch_size()
        );
        self.state = SchedulerState::Running { cancel, handle };
        Ok(())
    }

    /// Stop the flush task after its final drain-and-flush.
    pub async fn stop(&mut self) -> Result<(), SchedulerError> {
        match std::mem::replace(&mut self.state, SchedulerState::Stopped) {
            SchedulerState::Running { cancel, handle } => {
                cancel.cancel();
                handle
                    .await
                    .map_err(|e| SchedulerError::TaskFailed(e.to_string()))?;
                info!("Flush scheduler stopped after {} cycles", self.cycles());
                Ok(())
            }
            SchedulerState::Idle => {
                self.state = SchedulerState::Idle;
                Err(SchedulerError::NotStarted)
            }
            SchedulerState::Stopped => Err(SchedulerError::AlreadyStopped),
        }
    }
}

impl<T: Transport> Drop for FlushScheduler<T> {
    fn drop(&mut self) {
        if let SchedulerState::Running { cancel, .. } = &self.state {
            // The detached task still runs its final flush if the runtime lives on.
            warn!("Flush scheduler dropped while running; call stop() for an orderly shutdown");
            cancel.cancel();
        }
    }
}

async fn run_flush_loop<T: Transport>(
    buffers: Arc<BufferSet>,
    transmitter: Arc<BatchTransmitter<T>>,
    flush_interval: Duration,
    cycles: Arc<AtomicU64>,
    cancel: CancellationToken,
) {
    let mut ticker = interval_at(Instant::now() + flush_interval, flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                // Not raced against cancellation: an in-flight flush always completes.
                flush_buffers(&buffers, &transmitter).await;
                cycles.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    debug!("Flush loop cancelled, running final flush");
    flush_buffers(&buffers, &transmitter).await;
    cycles.fetch_add(1, Ordering::Relaxed);
}

/// Drain every buffer in turn and send its content.
///
/// Failures are logged per batch and never stop the remaining batches or
/// buffers. Concurrent calls on the same `BufferSet` run one after another.
pub async fn flush_buffers<T: Transport>(
    buffers: &BufferSet,
    transmitter: &BatchTransmitter<T>,
) -> Vec<(DataType, TransmissionReport)> {
    let _flushing = buffers.flush_lock().lock().await;
    let mut reports = Vec::with_capacity(DataType::ALL.len());

    for buffer in buffers.iter() {
        let points = buffer.drain_all();
        if points.is_empty() {
            continue;
        }

        let data_type = buffer.data_type();
        let report = transmitter.transmit(data_type, points).await;
        debug!(
            "Flushed {} {} points: {} accepted, {} rejected, {} failed batches",
            report.points,
            data_type,
            report.batches_accepted,
            report.batches_rejected,
            report.errors.len()
        );
        reports.push((data_type, report));
    }

    reports
}
