// ABOUTME: CLI formatting helpers
// ABOUTME: Shared rendering of typed values, dates, and long text in tables

use chrono::{DateTime, Utc};
use colored::*;
use sysconf_settings::{DecodeError, TypedValue};

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Plain-text rendering of a decoded value, used in tables
pub fn format_typed(typed: &Result<Option<TypedValue>, DecodeError>) -> String {
    match typed {
        Ok(Some(value)) => value.to_string(),
        Ok(None) => "-".to_string(),
        Err(e) => format!("error: {}", e),
    }
}

/// Colored rendering of a decoded value for detail views
pub fn describe_typed(typed: &Result<Option<TypedValue>, DecodeError>) -> ColoredString {
    match typed {
        Ok(Some(value)) => format!("{} ({})", value, value.value_type()).green(),
        Ok(None) => "not set".dimmed(),
        Err(e) => e.to_string().red(),
    }
}
