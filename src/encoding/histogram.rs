use super::{EncodingError, sanitize_name, write_source, write_tags};
use crate::domain::EncodedPoint;
use serde::{Deserialize, Serialize};

/// Aggregation interval of a histogram distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistogramGranularity {
    Minute,
    Hour,
    Day,
}

impl HistogramGranularity {
    pub const fn prefix(self) -> &'static str {
        match self {
            HistogramGranularity::Minute => "!M",
            HistogramGranularity::Hour => "!H",
            HistogramGranularity::Day => "!D",
        }
    }
}

/// `!M [<timestamp>] #<count> <mean> ... "<name>" source="<source>" [tags]`
///
/// `centroids` are `(mean, count)` pairs.
pub fn histogram_to_line_data<K, V>(
    name: &str,
    centroids: &[(f64, u64)],
    granularity: HistogramGranularity,
    timestamp: Option<i64>,
    source: Option<&str>,
    tags: &[(K, V)],
) -> Result<EncodedPoint, EncodingError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if name.trim().is_empty() {
        return Err(EncodingError::EmptyName);
    }
    if centroids.is_empty() {
        return Err(EncodingError::NoCentroids);
    }

    let mut line = String::from(granularity.prefix());
    if let Some(timestamp) = timestamp {
        line.push(' ');
        line.push_str(&timestamp.to_string());
    }

    for &(mean, count) in centroids {
        if !mean.is_finite() {
            return Err(EncodingError::NonFiniteValue { value: mean });
        }
        line.push_str(&format!(" #{count} {mean}"));
    }

    line.push(' ');
    line.push_str(&sanitize_name(name));
    write_source(&mut line, source)?;
    write_tags(&mut line, tags)?;

    Ok(EncodedPoint::from(line))
}
