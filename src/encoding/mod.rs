//! Wavefront line-data encoders.
//!
//! These produce the [`EncodedPoint`](crate::domain::EncodedPoint)s the
//! client transports. The pipeline itself never parses or validates them.

mod histogram;
mod metric;
mod sanitize;
mod span;

pub use histogram::{HistogramGranularity, histogram_to_line_data};
pub use metric::metric_to_line_data;
pub use sanitize::{default_source, sanitize_name, sanitize_value};
pub use span::{SpanContext, tracing_span_to_line_data};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodingError {
    #[error("Name must not be empty")]
    EmptyName,
    #[error("Source must not be empty")]
    EmptySource,
    #[error("Tag key and value must not be empty (key: '{key}')")]
    EmptyTag { key: String },
    #[error("Value must be finite, got {value}")]
    NonFiniteValue { value: f64 },
    #[error("Histogram must have at least one centroid")]
    NoCentroids,
}

/// Write ` "key"="value"` pairs, validating each one.
pub(crate) fn write_tags<K, V>(line: &mut String, tags: &[(K, V)]) -> Result<(), EncodingError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    for (key, value) in tags {
        let (key, value) = (key.as_ref(), value.as_ref());
        if key.trim().is_empty() || value.trim().is_empty() {
            return Err(EncodingError::EmptyTag {
                key: key.to_string(),
            });
        }
        line.push(' ');
        line.push_str(&sanitize_name(key));
        line.push('=');
        line.push_str(&sanitize_value(value));
    }
    Ok(())
}

/// Resolve and validate the `source="..."` field.
pub(crate) fn write_source(line: &mut String, source: Option<&str>) -> Result<(), EncodingError> {
    let source = match source {
        Some(source) => source.to_string(),
        None => default_source(),
    };
    if source.trim().is_empty() {
        return Err(EncodingError::EmptySource);
    }
    line.push_str(" source=");
    line.push_str(&sanitize_value(&source));
    Ok(())
}
