// Lock-free delivery counters, one set per data type.

use crate::domain::DataType;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
struct TypeCounters {
    points_enqueued: AtomicU64,
    points_sent: AtomicU64,
    batches_accepted: AtomicU64,
    batches_rejected: AtomicU64,
    transport_errors: AtomicU64,
    bytes_sent: AtomicU64,
}

/// Point-in-time copy of the counters for one data type (or their sum).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub points_enqueued: u64,
    pub points_sent: u64,
    pub batches_accepted: u64,
    pub batches_rejected: u64,
    pub transport_errors: u64,
    pub bytes_sent: u64,
}

impl StatsSnapshot {
    pub fn failures(&self) -> u64 {
        self.batches_rejected + self.transport_errors
    }
}

#[derive(Debug, Default)]
pub struct SenderStats {
    counters: [TypeCounters; 3],
}

impl SenderStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_enqueued(&self, data_type: DataType) {
        self.counters(data_type)
            .points_enqueued
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Record a batch the endpoint answered with 200/202.
    pub fn record_accepted(&self, data_type: DataType, points: usize, bytes: usize) {
        let counters = self.counters(data_type);
        counters.batches_accepted.fetch_add(1, Ordering::Relaxed);
        counters.points_sent.fetch_add(points as u64, Ordering::Relaxed);
        counters.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_rejected(&self, data_type: DataType, bytes: usize) {
        let counters = self.counters(data_type);
        counters.batches_rejected.fetch_add(1, Ordering::Relaxed);
        counters.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_transport_error(&self, data_type: DataType) {
        self.counters(data_type)
            .transport_errors
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, data_type: DataType) -> StatsSnapshot {
        let counters = self.counters(data_type);
        StatsSnapshot {
            points_enqueued: counters.points_enqueued.load(Ordering::Relaxed),
            points_sent: counters.points_sent.load(Ordering::Relaxed),
            batches_accepted: counters.batches_accepted.load(Ordering::Relaxed),
            batches_rejected: counters.batches_rejected.load(Ordering::Relaxed),
            transport_errors: counters.transport_errors.load(Ordering::Relaxed),
            bytes_sent: counters.bytes_sent.load(Ordering::Relaxed),
        }
    }

    pub fn total(&self) -> StatsSnapshot {
        DataType::ALL
            .iter()
            .map(|data_type| self.snapshot(*data_type))
            .fold(StatsSnapshot::default(), |acc, s| StatsSnapshot {
                points_enqueued: acc.points_enqueued + s.points_enqueued,
                points_sent: acc.points_sent + s.points_sent,
                batches_accepted: acc.batches_accepted + s.batches_accepted,
                batches_rejected: acc.batches_rejected + s.batches_rejected,
                transport_errors: acc.transport_errors + s.transport_errors,
                bytes_sent: acc.bytes_sent + s.bytes_sent,
            })
    }

    /// Rejected batches plus transport failures across all data types.
    pub fn failure_count(&self) -> u64 {
        self.total().failures()
    }

    fn counters(&self, data_type: DataType) -> &TypeCounters {
        &self.counters[data_type.index()]
    }
}
