//! Path safety and layout for attachment storage.
//!
//! Every stored path handed to a delete step passes through
//! [`validate_path`] before any file operation. The rule is a restricted
//! character set (ASCII alphanumerics, `_`, `-`, `\`, `/`, `.`) with no
//! two consecutive forward slashes anywhere, which rejects `//`-style
//! escapes from the media root while still allowing the nested date-based
//! layout produced by [`dated_path`].

use crate::error::{Result, TicketryError};
use chrono::{DateTime, Datelike, Utc};
use tracing::warn;

/// Check a path against the attachment path-safety rule.
#[must_use]
pub fn is_safe_path(path: &str) -> bool {
    if path.contains("//") {
        return false;
    }
    path.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '\\' | '/' | '.'))
}

/// Validate a path, logging and rejecting unsafe values.
///
/// Empty paths are rejected: the charset rule alone would vacuously
/// accept them, and an empty relative path resolves to the media root.
///
/// # Errors
///
/// Returns [`TicketryError::InvalidPath`] if the path fails the rule.
pub fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() || !is_safe_path(path) {
        warn!(path = %path, "rejected unsafe attachment path");
        return Err(TicketryError::InvalidPath {
            path: path.to_string(),
        });
    }
    Ok(())
}

/// Compose the date-based stored path for a file name:
/// `<year>/<month>/<day>/<name>`, relative to the media root.
#[must_use]
pub fn dated_path(now: DateTime<Utc>, file_name: &str) -> String {
    format!(
        "{:04}/{:02}/{:02}/{}",
        now.year(),
        now.month(),
        now.day(),
        file_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn accepts_nested_date_layout() {
        assert!(is_safe_path("2026/08/06/report.pdf"));
        assert!(is_safe_path("2026/08/06/screen-shot_2.png"));
    }

    #[test]
    fn accepts_backslash_separators() {
        assert!(is_safe_path(r"2026\08\06\report.pdf"));
    }

    #[test]
    fn rejects_doubled_separator() {
        assert!(!is_safe_path("2026//08/report.pdf"));
        assert!(!is_safe_path("//etc/passwd"));
        assert!(!is_safe_path("a//"));
    }

    #[test]
    fn rejects_characters_outside_charset() {
        assert!(!is_safe_path("2026/08/rep ort.pdf"));
        assert!(!is_safe_path("2026/08/répôrt.pdf"));
        assert!(!is_safe_path("a?b"));
        assert!(!is_safe_path("a*b"));
        assert!(!is_safe_path("a\0b"));
    }

    #[test]
    fn validate_rejects_empty() {
        assert!(validate_path("").is_err());
        assert!(validate_path("report.pdf").is_ok());
    }

    #[test]
    fn dated_path_zero_pads() {
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap();
        assert_eq!(dated_path(now, "report.pdf"), "2026/08/06/report.pdf");
        let jan = Utc.with_ymd_and_hms(2027, 1, 3, 0, 0, 0).unwrap();
        assert_eq!(dated_path(jan, "x.bin"), "2027/01/03/x.bin");
    }
}
