use super::{EncodingError, sanitize_name, write_source, write_tags};
use crate::domain::EncodedPoint;

/// `"<name>" <value> [<timestamp>] source="<source>" ["<k>"="<v>" ...]`
pub fn metric_to_line_data<K, V>(
    name: &str,
    value: f64,
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
    if !value.is_finite() {
        return Err(EncodingError::NonFiniteValue { value });
    }

    let mut line = sanitize_name(name);
    line.push(' ');
    line.push_str(&value.to_string());
    if let Some(timestamp) = timestamp {
        line.push(' ');
        line.push_str(&timestamp.to_string());
    }
    write_source(&mut line, source)?;
    write_tags(&mut line, tags)?;

    Ok(EncodedPoint::from(line))
}
