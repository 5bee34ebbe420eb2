//! Utility functions for timestamps, string manipulation, and file system operations.
//!
//! This module provides helper functions used throughout the application:
//! - Local ISO-8601 timestamps for `scraped_at` and `last_updated`
//! - Character-safe truncation and capitalization for scraped text
//! - File system validation for the output directory

use chrono::Local;
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Current local time as `YYYY-MM-DDTHH:MM:SS.ffffff`, without an offset.
pub fn now_iso() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Keep at most `max` characters of `s`.
///
/// Counts characters, not bytes, so Turkish text is never split mid-codepoint.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_chars("Çağdaş", 3), "Çağ");
/// ```
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}

/// Capitalize the first character of a string.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(upcase("hamlet"), "Hamlet");
/// assert_eq!(upcase(""), "");
/// ```
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file so
/// that permission problems surface before any scraping starts.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_short_string() {
        assert_eq!(truncate_chars("Hamlet", 500), "Hamlet");
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("Çağdaş Türk Tiyatrosu", 6), "Çağdaş");
        assert_eq!(truncate_chars("ığüşöç", 0), "");
    }

    #[test]
    fn test_upcase() {
        assert_eq!(upcase("hamlet"), "Hamlet");
        assert_eq!(upcase("çehov"), "Çehov");
        assert_eq!(upcase(""), "");
    }

    #[test]
    fn test_now_iso_shape() {
        let ts = now_iso();
        assert_eq!(ts.len(), "2025-05-06T20:30:00.000000".len());
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], "T");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_nested_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("data").join("out");
        let nested = nested.to_str().unwrap();
        ensure_writable_dir(nested).await.unwrap();
        assert!(std::path::Path::new(nested).is_dir());
    }
}
