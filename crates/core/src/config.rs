//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Environment variables are read by the binary only; the helpers
//! here take the raw values so they can be tested without touching the process environment.

use crate::constants::{DEFAULT_SESSION_DIR_NAME, DEFAULT_UTC_OFFSET, SESSION_FILENAME};
use crate::{CoreError, CoreResult};
use chrono::FixedOffset;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    session_path: PathBuf,
    utc_offset: FixedOffset,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(session_path: PathBuf, utc_offset: FixedOffset) -> CoreResult<Self> {
        if session_path.as_os_str().is_empty() {
            return Err(CoreError::InvalidInput(
                "session path cannot be empty".into(),
            ));
        }

        Ok(Self {
            session_path,
            utc_offset,
        })
    }

    /// File that stands in for browser local storage.
    pub fn session_path(&self) -> &Path {
        &self.session_path
    }

    /// Offset used to turn timestamps into calendar days, weeks, months and years.
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }
}

/// Parse a display offset such as `+07:00`, `-0530` or `Z`.
///
/// If `value` is `None` or empty/whitespace, returns the default `+07:00`.
pub fn utc_offset_from_env_value(value: Option<String>) -> CoreResult<FixedOffset> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_UTC_OFFSET.to_string());

    parse_utc_offset(&value)
        .ok_or_else(|| CoreError::InvalidInput(format!("invalid UTC offset: {value}")))
}

fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 14 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Resolve the session file location.
///
/// An explicit override wins. Otherwise the session lives at
/// `<home>/.emr-dashboard/session.json`, or relative to the working directory when no home
/// directory is known.
pub fn session_path_from_env_value(override_path: Option<String>, home: Option<String>) -> PathBuf {
    if let Some(path) = override_path.filter(|p| !p.trim().is_empty()) {
        return PathBuf::from(path);
    }

    let base = home
        .filter(|h| !h.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_default();
    base.join(DEFAULT_SESSION_DIR_NAME).join(SESSION_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_offset_is_indochina_time() {
        let offset = utc_offset_from_env_value(None).expect("default should parse");
        assert_eq!(offset.local_minus_utc(), 7 * 3600);
    }

    #[test]
    fn test_offset_variants() {
        let cases = [
            ("+07:00", 7 * 3600),
            ("-0530", -(5 * 3600 + 30 * 60)),
            ("+09", 9 * 3600),
            ("Z", 0),
            ("  UTC ", 0),
        ];
        for (input, expected) in cases {
            let offset = utc_offset_from_env_value(Some(input.to_string()))
                .unwrap_or_else(|e| panic!("{input} should parse: {e}"));
            assert_eq!(offset.local_minus_utc(), expected, "{input}");
        }
    }

    #[test]
    fn test_offset_rejects_garbage() {
        for input in ["07:00", "+7:0", "+25:00", "+ab:cd"] {
            assert!(
                utc_offset_from_env_value(Some(input.to_string())).is_err(),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_session_path_override_wins() {
        let path = session_path_from_env_value(
            Some("/tmp/s.json".into()),
            Some("/home/doctor".into()),
        );
        assert_eq!(path, PathBuf::from("/tmp/s.json"));
    }

    #[test]
    fn test_session_path_defaults_under_home() {
        let path = session_path_from_env_value(None, Some("/home/doctor".into()));
        assert_eq!(
            path,
            PathBuf::from("/home/doctor/.emr-dashboard/session.json")
        );
    }

    #[test]
    fn test_config_rejects_empty_session_path() {
        let offset = utc_offset_from_env_value(None).expect("default");
        assert!(CoreConfig::new(PathBuf::new(), offset).is_err());
    }
}
