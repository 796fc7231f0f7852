use super::{EncodingError, sanitize_name, write_source, write_tags};
use crate::domain::EncodedPoint;
use uuid::Uuid;

/// Identity and causal links of one span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanContext {
    pub trace_id: Uuid,
    pub span_id: Uuid,
    pub parents: Vec<Uuid>,
    pub follows_from: Vec<Uuid>,
}

impl SpanContext {
    /// A root span in a fresh trace.
    pub fn new_root() -> Self {
        Self {
            trace_id: Uuid::new_v4(),
            span_id: Uuid::new_v4(),
            parents: Vec::new(),
            follows_from: Vec::new(),
        }
    }

    /// A new span in the same trace, child of `self`.
    pub fn child(&self) -> Self {
        Self {
            trace_id: self.trace_id,
            span_id: Uuid::new_v4(),
            parents: vec![self.span_id],
            follows_from: Vec::new(),
        }
    }
}

/// `"<name>" source="<source>" traceId=<id> spanId=<id> [parent=<id>...]
/// [followsFrom=<id>...] ["<k>"="<v>"...] <start_millis> <duration_millis>`
pub fn tracing_span_to_line_data<K, V>(
    name: &str,
    start_millis: i64,
    duration_millis: i64,
    source: Option<&str>,
    context: &SpanContext,
    tags: &[(K, V)],
) -> Result<EncodedPoint, EncodingError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if name.trim().is_empty() {
        return Err(EncodingError::EmptyName);
    }

    let mut line = sanitize_name(name);
    write_source(&mut line, source)?;
    line.push_str(&format!(
        " traceId={} spanId={}",
        context.trace_id, context.span_id
    ));
    for parent in &context.parents {
        line.push_str(&format!(" parent={parent}"));
    }
    for follows_from in &context.follows_from {
        line.push_str(&format!(" followsFrom={follows_from}"));
    }
    write_tags(&mut line, tags)?;
    line.push_str(&format!(" {start_millis} {duration_millis}"));

    Ok(EncodedPoint::from(line))
}
