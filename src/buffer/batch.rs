use crate::domain::EncodedPoint;
use std::time::Instant;
use uuid::Uuid;

/// An ordered, size-bounded slice of points sent in a single request.
#[derive(Debug, Clone)]
pub struct Batch {
    id: String,
    entries: Vec<EncodedPoint>,
    created_at: Instant,
}

impl Batch {
    pub fn new(entries: Vec<EncodedPoint>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            entries,
            created_at: Instant::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[EncodedPoint] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<EncodedPoint> {
        self.entries
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Uncompressed report body: every point followed by `\n`.
    pub fn payload(&self) -> String {
        let capacity = self.entries.iter().map(|p| p.len() + 1).sum();
        let mut payload = String::with_capacity(capacity);
        for entry in &self.entries {
            payload.push_str(entry.as_str());
            payload.push('\n');
        }
        payload
    }
}

/// Partition `points` into consecutive batches of at most `batch_size`.
///
/// Yields `ceil(n / batch_size)` batches; an empty input yields none. A
/// `batch_size` of zero is treated as one.
pub fn split_into_batches(points: Vec<EncodedPoint>, batch_size: usize) -> Vec<Batch> {
    let batch_size = batch_size.max(1);
    let mut batches = Vec::with_capacity(points.len().div_ceil(batch_size));
    let mut remaining = points.into_iter();

    loop {
        let chunk: Vec<EncodedPoint> = remaining.by_ref().take(batch_size).collect();
        if chunk.is_empty() {
            break;
        }
        batches.push(Batch::new(chunk));
    }

    batches
}
