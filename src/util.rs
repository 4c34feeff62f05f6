//! Small utility helpers used across modules.

use chrono::{DateTime, NaiveDateTime};

/// Format a history timestamp the way the page shows dates: `dd.mm.yyyy, HH:MM`.
///
/// The backend stores `YYYY-MM-DD HH:MM:SS`; RFC 3339 is accepted too and
/// shown in its own offset. Anything else is returned as-is.
pub fn format_created_at(raw: &str) -> String {
  let raw = raw.trim();
  let parsed = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
    .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
    .ok()
    .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()));
  match parsed {
    Some(dt) => dt.format("%d.%m.%Y, %H:%M").to_string(),
    None => raw.to_string(),
  }
}

/// Log-safe truncation for large strings.
pub fn trunc_for_log(s: &str, max_chars: usize) -> String {
  let count = s.chars().count();
  if count <= max_chars {
    s.to_string()
  } else {
    format!("{}… ({} chars total)", s.chars().take(max_chars).collect::<String>(), count)
  }
}
