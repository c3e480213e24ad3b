//! Magnet extraction from search results.
//!
//! The search service returns each result as a stringified list, e.g.
//! `"['magnet:?xt=urn:btih:XYZ', 'Title', '5.40GB', '2023-01-01']"`.
//! `extract_magnet` is a compatibility shim for exactly that rendering; it is
//! not a general parser and must not be used as one.

use serde_json::Value;

/// First comma-separated segment of the entry, stripped of surrounding
/// whitespace, `[` and `'`. `None` when nothing is left.
pub fn extract_magnet(entry: &Value) -> Option<String> {
    let rendered = match entry {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let first_segment = rendered.split(',').next().unwrap_or_default();
    let magnet = first_segment
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '[' | '\''));

    if magnet.is_empty() {
        None
    } else {
        Some(magnet.to_string())
    }
}
