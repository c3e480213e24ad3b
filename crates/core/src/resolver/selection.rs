//! "Best" magnet selection across all search results.
//!
//! Each result is `[magnet, name, size, date]`, usually rendered as a Python
//! list literal. Among the releases whose size is within 70% of the largest
//! one, the smallest wins; ties go to the newest upload date.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde_json::Value;
use tracing::debug;

use super::MAGNET_PREFIX;

/// Fraction of the largest size an entry needs to join the HD cluster.
const HD_CLUSTER_RATIO: f64 = 0.7;

static SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\d.]+)\s*([KMGTPEZY]?B)$").unwrap());

/// A fully parsed search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchEntry {
    pub magnet: String,
    pub name: String,
    pub size_bytes: u64,
    pub date: Option<NaiveDate>,
}

/// Pick the preferred magnet, or `None` if no entry parses.
pub fn select_best(entries: &[Value]) -> Option<String> {
    let parsed: Vec<SearchEntry> = entries.iter().filter_map(parse_entry).collect();
    let first = parsed.first()?;

    let max_size = parsed.iter().map(|e| e.size_bytes).max().unwrap_or(0);
    if max_size == 0 {
        return Some(first.magnet.clone());
    }

    let threshold = max_size as f64 * HD_CLUSTER_RATIO;
    let mut cluster: Vec<&SearchEntry> = parsed
        .iter()
        .filter(|e| e.size_bytes as f64 >= threshold)
        .collect();
    cluster.sort_by(|a, b| {
        a.size_bytes
            .cmp(&b.size_bytes)
            .then_with(|| b.date.cmp(&a.date))
    });

    let chosen = cluster.first()?;
    debug!(
        parsed = parsed.len(),
        cluster = cluster.len(),
        max_size,
        name = %chosen.name,
        size = chosen.size_bytes,
        "Selected magnet from search results"
    );
    Some(chosen.magnet.clone())
}

/// Parse one result. Entries without a magnet or with an unreadable size
/// are skipped; an unreadable date only loses the tie-break.
pub fn parse_entry(entry: &Value) -> Option<SearchEntry> {
    let fields = match entry {
        Value::String(s) => parse_list_literal(s)?,
        Value::Array(items) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()?,
        _ => return None,
    };

    if fields.len() < 4 {
        return None;
    }

    let magnet = fields[0].clone();
    if !magnet.starts_with(MAGNET_PREFIX) {
        return None;
    }

    Some(SearchEntry {
        magnet,
        name: fields[1].clone(),
        size_bytes: parse_size(&fields[2])?,
        date: NaiveDate::parse_from_str(fields[3].trim(), "%Y-%m-%d").ok(),
    })
}

/// Convert a size such as `5.40GB` or `700 MB` to bytes (1024-based).
/// An empty size counts as 0.
pub fn parse_size(size: &str) -> Option<u64> {
    let size = size.trim().to_uppercase();
    if size.is_empty() {
        return Some(0);
    }

    let captures = SIZE_RE.captures(&size)?;
    let value: f64 = captures.get(1)?.as_str().parse().ok()?;
    let exponent = match captures.get(2)?.as_str().chars().next()? {
        'K' => 1,
        'M' => 2,
        'G' => 3,
        'T' => 4,
        'P' => 5,
        'E' => 6,
        'Z' => 7,
        'Y' => 8,
        _ => 0,
    };

    Some((value * 1024f64.powi(exponent)) as u64)
}

/// Parse a flat list of quoted strings: `['a', "b's", 'c']`.
fn parse_list_literal(input: &str) -> Option<Vec<String>> {
    let mut chars = input.trim().chars().peekable();
    if chars.next()? != '[' {
        return None;
    }

    let mut items = Vec::new();
    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next()? {
            ']' if items.is_empty() => return Some(items),
            quote @ ('\'' | '"') => {
                let mut item = String::new();
                loop {
                    match chars.next()? {
                        '\\' => item.push(chars.next()?),
                        c if c == quote => break,
                        c => item.push(c),
                    }
                }
                items.push(item);
            }
            _ => return None,
        }

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next()? {
            ',' => continue,
            ']' => return Some(items),
            _ => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const GB: u64 = 1024 * 1024 * 1024;

    fn entry(hash: &str, size: &str, date: &str) -> Value {
        json!(format!(
            "['magnet:?xt=urn:btih:{}', 'ABC-123 {}', '{}', '{}']",
            hash, hash, size, date
        ))
    }

    #[test]
    fn test_parse_size_units() {
        assert_eq!(parse_size("1KB"), Some(1024));
        assert_eq!(parse_size("1.5MB"), Some(1536 * 1024));
        assert_eq!(parse_size("2GB"), Some(2 * GB));
        assert_eq!(parse_size("5.40gb"), Some((5.40 * GB as f64) as u64));
        assert_eq!(parse_size("700 MB"), Some(700 * 1024 * 1024));
        assert_eq!(parse_size("512B"), Some(512));
        assert_eq!(parse_size(""), Some(0));
        assert_eq!(parse_size("big"), None);
        assert_eq!(parse_size("12 parsecs"), None);
    }

    #[test]
    fn test_parse_list_literal_handles_quotes_and_commas() {
        assert_eq!(
            parse_list_literal(r#"['a', "it's, ok", 'c\'d']"#),
            Some(vec!["a".to_string(), "it's, ok".to_string(), "c'd".to_string()])
        );
        assert_eq!(parse_list_literal("[]"), Some(Vec::new()));
        assert_eq!(parse_list_literal("['unterminated"), None);
        assert_eq!(parse_list_literal("not a list"), None);
        assert_eq!(parse_list_literal("['a' 'b']"), None);
    }

    #[test]
    fn test_parse_entry_full() {
        let parsed = parse_entry(&entry("AAA", "5.40GB", "2023-01-01")).unwrap();
        assert_eq!(parsed.magnet, "magnet:?xt=urn:btih:AAA");
        assert_eq!(parsed.name, "ABC-123 AAA");
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2023, 1, 1));
    }

    #[test]
    fn test_parse_entry_rejects_bad_rows() {
        assert!(parse_entry(&json!("['magnet:?xt=urn:btih:A', 'name']")).is_none());
        assert!(parse_entry(&json!("['http://x', 'n', '1GB', '2023-01-01']")).is_none());
        assert!(parse_entry(&json!("['magnet:?xt=urn:btih:A', 'n', 'huge', '2023-01-01']")).is_none());
        assert!(parse_entry(&json!(42)).is_none());
    }

    #[test]
    fn test_parse_entry_bad_date_is_kept() {
        let parsed = parse_entry(&entry("AAA", "1GB", "someday")).unwrap();
        assert_eq!(parsed.date, None);
    }

    #[test]
    fn test_parse_entry_json_array() {
        let parsed = parse_entry(&json!([
            "magnet:?xt=urn:btih:ARR",
            "name",
            "1GB",
            "2024-02-02"
        ]))
        .unwrap();
        assert_eq!(parsed.magnet, "magnet:?xt=urn:btih:ARR");
        assert_eq!(parsed.size_bytes, GB);
    }

    #[test]
    fn test_select_best_prefers_smallest_in_hd_cluster() {
        let entries = vec![
            entry("SD", "1.2GB", "2023-01-01"),
            entry("HD_BIG", "6.0GB", "2023-01-01"),
            entry("HD_SMALL", "4.5GB", "2023-01-01"),
        ];
        // 4.5 >= 0.7 * 6.0, 1.2 is not.
        assert_eq!(
            select_best(&entries),
            Some("magnet:?xt=urn:btih:HD_SMALL".to_string())
        );
    }

    #[test]
    fn test_select_best_breaks_ties_by_newest_date() {
        let entries = vec![
            entry("OLD", "5GB", "2022-05-01"),
            entry("UNDATED", "5GB", ""),
            entry("NEW", "5GB", "2023-09-30"),
        ];
        assert_eq!(
            select_best(&entries),
            Some("magnet:?xt=urn:btih:NEW".to_string())
        );
    }

    #[test]
    fn test_select_best_zero_sizes_picks_first_parsed() {
        let entries = vec![
            json!("garbage"),
            entry("FIRST", "", "2022-01-01"),
            entry("SECOND", "", "2023-01-01"),
        ];
        assert_eq!(
            select_best(&entries),
            Some("magnet:?xt=urn:btih:FIRST".to_string())
        );
    }

    #[test]
    fn test_select_best_nothing_parses() {
        assert_eq!(select_best(&[json!("garbage"), json!(1)]), None);
        assert_eq!(select_best(&[]), None);
    }
}
