use std::fmt;

/// One fully formatted line-data record.
///
/// The pipeline never looks inside; it only joins points with `\n` when
/// building a report payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedPoint(String);

impl EncodedPoint {
    pub fn new(line: impl Into<String>) -> Self {
        Self(line.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for EncodedPoint {
    fn from(line: String) -> Self {
        Self(line)
    }
}

impl From<&str> for EncodedPoint {
    fn from(line: &str) -> Self {
        Self(line.to_owned())
    }
}

impl AsRef<str> for EncodedPoint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EncodedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
