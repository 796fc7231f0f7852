use super::error::BufferError;
use crate::domain::{DataType, EncodedPoint};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::pin::pin;
use tokio::sync::Notify;
use tracing::trace;

#[derive(Default)]
struct Slots {
    points: VecDeque<EncodedPoint>,
    closed: bool,
}

/// Capacity-limited FIFO of encoded points for a single data type.
///
/// `push` waits for free space instead of dropping, and `drain_all` hands the
/// whole resident content to the flusher in one step. Both operations hold the
/// same lock, so a drain never observes a half-inserted point.
///
/// Once closed the buffer refuses new points and wakes every waiting
/// producer, but resident points stay drainable.
pub struct BoundedBuffer {
    data_type: DataType,
    capacity: usize,
    slots: Mutex<Slots>,
    space_available: Notify,
}

impl BoundedBuffer {
    pub fn new(data_type: DataType, capacity: usize) -> Result<Self, BufferError> {
        if capacity == 0 {
            return Err(BufferError::InvalidCapacity { capacity });
        }

        Ok(Self {
            data_type,
            capacity,
            // Grows on demand; max_queue_size is an upper bound, not a reservation
            slots: Mutex::new(Slots::default()),
            space_available: Notify::new(),
        })
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.slots.lock().points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().points.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    pub fn is_closed(&self) -> bool {
        self.slots.lock().closed
    }

    /// Append a point, waiting while the buffer is at capacity.
    ///
    /// Hands the point back if the buffer is closed, either on entry or while
    /// waiting for space.
    pub async fn push(&self, point: EncodedPoint) -> Result<(), EncodedPoint> {
        loop {
            // Register interest before checking, so a drain or close that lands
            // between the check and the await still wakes us.
            let mut notified = pin!(self.space_available.notified());
            notified.as_mut().enable();

            {
                let mut slots = self.slots.lock();
                if slots.closed {
                    return Err(point);
                }
                if slots.points.len() < self.capacity {
                    slots.points.push_back(point);
                    return Ok(());
                }
            }

            trace!(data_type = %self.data_type, "buffer full, waiting for drain");
            notified.await;
        }
    }

    /// Append a point without waiting. Hands the point back when full or
    /// closed.
    pub fn try_push(&self, point: EncodedPoint) -> Result<(), EncodedPoint> {
        let mut slots = self.slots.lock();
        if slots.closed || slots.points.len() >= self.capacity {
            return Err(point);
        }
        slots.points.push_back(point);
        Ok(())
    }

    /// Remove and return every resident point in insertion order.
    pub fn drain_all(&self) -> Vec<EncodedPoint> {
        let drained: Vec<EncodedPoint> = {
            let mut slots = self.slots.lock();
            slots.points.drain(..).collect()
        };

        if !drained.is_empty() {
            self.space_available.notify_waiters();
        }

        drained
    }

    /// Refuse further points and release every producer waiting for space.
    pub fn close(&self) {
        self.slots.lock().closed = true;
        self.space_available.notify_waiters();
    }
}

impl std::fmt::Debug for BoundedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.slots.lock();
        f.debug_struct("BoundedBuffer")
            .field("data_type", &self.data_type)
            .field("capacity", &self.capacity)
            .field("len", &slots.points.len())
            .field("closed", &slots.closed)
            .finish()
    }
}

/// One buffer per data type, all sharing the same capacity.
#[derive(Debug)]
pub struct BufferSet {
    buffers: [BoundedBuffer; 3],
    flush_lock: tokio::sync::Mutex<()>,
}

impl BufferSet {
    pub fn new(capacity: usize) -> Result<Self, BufferError> {
        Ok(Self {
            buffers: [
                BoundedBuffer::new(DataType::Metric, capacity)?,
                BoundedBuffer::new(DataType::Histogram, capacity)?,
                BoundedBuffer::new(DataType::Span, capacity)?,
            ],
            flush_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn get(&self, data_type: DataType) -> &BoundedBuffer {
        &self.buffers[data_type.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundedBuffer> {
        self.buffers.iter()
    }

    pub fn total_len(&self) -> usize {
        self.buffers.iter().map(BoundedBuffer::len).sum()
    }

    pub fn close_all(&self) {
        for buffer in &self.buffers {
            buffer.close();
        }
    }

    /// Held by a flush from its first drain to its last send, so two flushes
    /// never interleave and each buffer reaches the endpoint in FIFO order.
    pub fn flush_lock(&self) -> &tokio::sync::Mutex<()> {
        &self.flush_lock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn point(i: usize) -> EncodedPoint {
        EncodedPoint::new(format!("\"cpu.usage\" {i} source=\"host\""))
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = BoundedBuffer::new(DataType::Metric, 0);
        assert_eq!(
            result.unwrap_err(),
            BufferError::InvalidCapacity { capacity: 0 }
        );
    }

    #[test]
    fn test_try_push_hands_point_back_when_full() {
        let buffer = BoundedBuffer::new(DataType::Metric, 2).unwrap();
        assert!(buffer.try_push(point(0)).is_ok());
        assert!(buffer.try_push(point(1)).is_ok());

        let rejected = buffer.try_push(point(2)).unwrap_err();
        assert_eq!(rejected, point(2));
        assert_eq!(buffer.len(), 2);
        assert!(buffer.is_full());
    }

    #[test]
    fn test_drain_on_empty_buffer() {
        let buffer = BoundedBuffer::new(DataType::Span, 4).unwrap();
        assert!(buffer.drain_all().is_empty());
        assert!(buffer.is_empty());
    }

    #[tokio::test]
    async fn test_drain_preserves_insertion_order() {
        let buffer = BoundedBuffer::new(DataType::Histogram, 10).unwrap();
        for i in 0..7 {
            buffer.push(point(i)).await.unwrap();
        }

        let drained = buffer.drain_all();
        let expected: Vec<EncodedPoint> = (0..7).map(point).collect();
        assert_eq!(drained, expected);
        assert!(buffer.is_empty());
    }

    #[tokio::test]
    async fn test_blocked_push_resumes_after_drain() {
        let buffer = Arc::new(BoundedBuffer::new(DataType::Metric, 1).unwrap());
        buffer.push(point(0)).await.unwrap();

        let producer = {
            let buffer = buffer.clone();
            tokio::spawn(async move { buffer.push(point(1)).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!producer.is_finished());

        assert_eq!(buffer.drain_all(), vec![point(0)]);
        tokio::time::timeout(Duration::from_secs(1), producer)
            .await
            .expect("producer should resume after drain")
            .unwrap()
            .unwrap();
        assert_eq!(buffer.drain_all(), vec![point(1)]);
    }

    #[tokio::test]
    async fn test_close_releases_waiting_producers() {
        let buffer = Arc::new(BoundedBuffer::new(DataType::Metric, 1).unwrap());
        buffer.push(point(0)).await.unwrap();

        let producers: Vec<_> = (1..4)
            .map(|i| {
                let buffer = buffer.clone();
                tokio::spawn(async move { buffer.push(point(i)).await })
            })
            .collect();
        tokio::time::sleep(Duration::from_millis(50)).await;

        buffer.close();

        for (i, producer) in (1..4).zip(producers) {
            let result = tokio::time::timeout(Duration::from_secs(1), producer)
                .await
                .expect("closed buffer must not keep producers waiting")
                .unwrap();
            assert_eq!(result, Err(point(i)));
        }

        // Resident points survive the close
        assert_eq!(buffer.drain_all(), vec![point(0)]);
    }

    #[tokio::test]
    async fn test_closed_buffer_refuses_points() {
        let buffer = BoundedBuffer::new(DataType::Span, 4).unwrap();
        buffer.close();

        assert!(buffer.is_closed());
        assert_eq!(buffer.push(point(0)).await, Err(point(0)));
        assert_eq!(buffer.try_push(point(1)), Err(point(1)));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_buffer_set_routes_by_data_type() {
        let set = BufferSet::new(3).unwrap();
        for data_type in DataType::ALL {
            assert_eq!(set.get(data_type).data_type(), data_type);
            assert_eq!(set.get(data_type).capacity(), 3);
        }

        set.get(DataType::Span).try_push(point(0)).unwrap();
        assert_eq!(set.total_len(), 1);
        assert!(set.get(DataType::Metric).is_empty());
    }
}
