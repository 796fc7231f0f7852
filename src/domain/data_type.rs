use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of telemetry carried by a report.
///
/// Each variant owns its own buffer inside a client and is tagged on the wire
/// with a fixed format discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Plain metric points (`wavefront` format)
    Metric,
    /// Histogram distributions (`histogram` format)
    Histogram,
    /// Tracing spans (`trace` format)
    Span,
}

impl DataType {
    /// Flush order used by the scheduler.
    pub const ALL: [DataType; 3] = [DataType::Metric, DataType::Histogram, DataType::Span];

    /// Value of the `f` query parameter on the report endpoint.
    pub const fn format(self) -> &'static str {
        match self {
            DataType::Metric => "wavefront",
            DataType::Histogram => "histogram",
            DataType::Span => "trace",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            DataType::Metric => 0,
            DataType::Histogram => 1,
            DataType::Span => 2,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Metric => "metric",
            DataType::Histogram => "histogram",
            DataType::Span => "span",
        };
        f.write_str(name)
    }
}
