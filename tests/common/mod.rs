#![allow(dead_code)]

use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::io;
use std::time::Duration;
use wavefront_sender::sender::decompress_payload;
use wavefront_sender::{DataType, Delivery, Transport, TransportError};

/// What the next `send` call should do.
#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    Status(u16),
    Unreachable,
}

/// In-memory transport that records every attempted report.
#[derive(Default)]
pub struct RecordingTransport {
    attempts: Mutex<Vec<(DataType, String)>>,
    script: Mutex<VecDeque<Outcome>>,
    delay: Option<Duration>,
    delays: Mutex<VecDeque<Duration>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Delay each call by the next entry of `delays`; later calls are not
    /// delayed.
    pub fn with_delays(delays: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            delays: Mutex::new(delays.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Every attempted report as `(data type, decompressed body)`.
    pub fn attempts(&self) -> Vec<(DataType, String)> {
        self.attempts.lock().clone()
    }

    pub fn attempts_for(&self, data_type: DataType) -> Vec<String> {
        self.attempts
            .lock()
            .iter()
            .filter(|(t, _)| *t == data_type)
            .map(|(_, body)| body.clone())
            .collect()
    }
}

impl Transport for RecordingTransport {
    async fn send(&self, payload: Bytes, data_type: DataType) -> Result<Delivery, TransportError> {
        let delay = self.delays.lock().pop_front().or(self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let body = String::from_utf8(decompress_payload(&payload)?).expect("payload is utf-8");
        self.attempts.lock().push((data_type, body));

        let outcome = self.script.lock().pop_front().unwrap_or(Outcome::Status(202));
        match outcome {
            Outcome::Status(code) => Ok(Delivery::from_status(
                StatusCode::from_u16(code).expect("valid status code"),
            )),
            Outcome::Unreachable => Err(TransportError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
        }
    }
}

pub fn metric_line(i: usize) -> String {
    format!("\"app.requests\" {i} 1700000000 source=\"test-host\"")
}

pub fn lines(n: usize) -> Vec<String> {
    (0..n).map(metric_line).collect()
}

/// Expected report body for `points`.
pub fn joined(points: &[String]) -> String {
    let mut body = points.join("\n");
    body.push('\n');
    body
}
