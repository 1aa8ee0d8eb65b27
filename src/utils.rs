//! Utility functions for timestamp parsing, text cleanup, and file system checks.
//!
//! This module provides helpers used by the site adapters and the output step:
//! - Timestamp parsing for the formats the news sites print
//! - Whitespace flattening for headline text
//! - String truncation for logging
//! - File system validation for output directories

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a publication timestamp as printed by a news site or typed on the CLI.
///
/// Accepted forms, tried in order:
/// - RFC 3339 (`2020-01-15T10:30:00+08:00`): the offset is dropped and the
///   wall-clock time kept, matching the sites' local-time convention
/// - `YYYY-MM-DD HH:MM[:SS]`, `YYYY/MM/DD HH:MM[:SS]`, `YYYY-MM-DDTHH:MM[:SS]`
/// - a bare date (`YYYY-MM-DD` or `YYYY/MM/DD`), read as midnight
///
/// # Returns
///
/// `None` when no form matches.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Collapse runs of whitespace into a single space and trim the ends.
///
/// Headlines come out of nested highlight markup (`<u>`, `<em>`) with the
/// indentation of the surrounding HTML still attached.
pub fn flatten_text<'a>(fragments: impl IntoIterator<Item = &'a str>) -> String {
    let joined: String = fragments.into_iter().collect();
    WHITESPACE_RUN.replace_all(joined.trim(), " ").into_owned()
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and a
/// byte count indicator appended. Cuts on a character boundary, so CJK
/// headlines are safe.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Ensure the parent directory of an output file exists and is writable.
///
/// Creates the directory if needed, then performs a write test by creating
/// and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %file_path))]
pub async fn ensure_writable_parent(file_path: &str) -> Result<(), Box<dyn Error>> {
    let dir = match Path::new(file_path).parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    fs::create_dir_all(&dir).await?;
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = dir.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!(dir = %dir.display(), "Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd_hms(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_parse_timestamp_site_formats() {
        let expected = ymd_hms(2020, 1, 15, 10, 30, 0);
        assert_eq!(parse_timestamp("2020-01-15 10:30"), Some(expected));
        assert_eq!(parse_timestamp("2020-01-15 10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2020/01/15 10:30"), Some(expected));
        assert_eq!(parse_timestamp("  2020-01-15T10:30:00 "), Some(expected));
    }

    #[test]
    fn test_parse_timestamp_rfc3339_keeps_wall_clock() {
        assert_eq!(
            parse_timestamp("2020-01-15T10:30:00+08:00"),
            Some(ymd_hms(2020, 1, 15, 10, 30, 0))
        );
    }

    #[test]
    fn test_parse_timestamp_date_only_is_midnight() {
        assert_eq!(parse_timestamp("2020-01-10"), Some(ymd_hms(2020, 1, 10, 0, 0, 0)));
        assert_eq!(parse_timestamp("2020/01/10"), Some(ymd_hms(2020, 1, 10, 0, 0, 0)));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_flatten_text() {
        assert_eq!(flatten_text(["  台積電", "\n  法說會 ", " "]), "台積電 法說會");
        assert_eq!(flatten_text(["a\t\tb"]), "a b");
        assert_eq!(flatten_text(Vec::<&str>::new()), "");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        let result = truncate_for_log("台積電法說會", 2);
        assert!(result.starts_with("台積…"));
        assert!(result.contains("(+12 bytes)"));
    }

    #[tokio::test]
    async fn test_ensure_writable_parent_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("nested/out/results.json");
        ensure_writable_parent(target.to_str().unwrap()).await.unwrap();
        assert!(tmp.path().join("nested/out").is_dir());
    }
}
