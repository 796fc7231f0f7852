const DELTA_PREFIXES: [char; 2] = ['\u{2206}', '\u{0394}'];

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

/// Quote a metric name or tag key, replacing disallowed characters with `-`.
///
/// A leading `~` (internal metric) or delta sign is kept as is.
pub fn sanitize_name(name: &str) -> String {
    let name = name.trim();
    let mut sanitized = String::with_capacity(name.len() + 2);
    sanitized.push('"');

    for (i, c) in name.chars().enumerate() {
        let keep = is_allowed(c) || (i == 0 && (c == '~' || DELTA_PREFIXES.contains(&c)));
        sanitized.push(if keep { c } else { '-' });
    }

    sanitized.push('"');
    sanitized
}

/// Quote a tag or source value, escaping backslashes, quotes and newlines.
pub fn sanitize_value(value: &str) -> String {
    let value = value.trim();
    let mut sanitized = String::with_capacity(value.len() + 2);
    sanitized.push('"');

    for c in value.chars() {
        match c {
            '\\' => sanitized.push_str("\\\\"),
            '"' => sanitized.push_str("\\\""),
            '\n' => sanitized.push_str("\\n"),
            c => sanitized.push(c),
        }
    }

    sanitized.push('"');
    sanitized
}

/// Local hostname, used when no source is given.
pub fn default_source() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name_replaces_disallowed() {
        assert_eq!(sanitize_name("cpu usage/total"), "\"cpu-usage-total\"");
        assert_eq!(sanitize_name("http.req_count-2xx"), "\"http.req_count-2xx\"");
    }

    #[test]
    fn test_sanitize_name_keeps_leading_prefixes() {
        assert_eq!(sanitize_name("~sdk.points"), "\"~sdk.points\"");
        assert_eq!(sanitize_name("\u{2206}requests"), "\"\u{2206}requests\"");
        assert_eq!(sanitize_name("a~b"), "\"a-b\"");
    }

    #[test]
    fn test_sanitize_value_escapes() {
        assert_eq!(sanitize_value("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(sanitize_value("two\nlines"), "\"two\\nlines\"");
        assert_eq!(sanitize_value("  padded  "), "\"padded\"");
    }

    #[test]
    fn test_sanitize_value_escapes_backslash() {
        // A trailing backslash must not swallow the closing quote
        assert_eq!(sanitize_value("C:\\temp\\"), "\"C:\\\\temp\\\\\"");
        assert_eq!(sanitize_value("a\\\"b"), "\"a\\\\\\\"b\"");
    }

    #[test]
    fn test_default_source_not_empty() {
        assert!(!default_source().is_empty());
    }
}
