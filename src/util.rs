//! Small utility helpers used across modules.

use chrono::{DateTime, Local, TimeZone};
use uuid::Uuid;

/// Rounded integer percentage; 0 when `total` is 0.
pub fn percent(part: usize, total: usize) -> u32 {
  if total == 0 {
    return 0;
  }
  ((part as f64 / total as f64) * 100.0).round() as u32
}

/// "2026年10月16日 09:05" style timestamp for reports.
pub fn format_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
  Tz::Offset: std::fmt::Display,
{
  dt.format("%Y年%m月%d日 %H:%M").to_string()
}

/// Session id: local date plus six random characters, e.g. "2026-10-16-3fa9c2".
pub fn new_session_id() -> String {
  let date = Local::now().format("%Y-%m-%d");
  let suffix: String = Uuid::new_v4().simple().to_string().chars().take(6).collect();
  format!("{}-{}", date, suffix)
}

/// Log-safe truncation for long stems.
/// Cuts on a char boundary so CJK text never panics.
pub fn trunc_for_log(s: &str, max_chars: usize) -> String {
  let count = s.chars().count();
  if count <= max_chars {
    s.to_string()
  } else {
    let head: String = s.chars().take(max_chars).collect();
    format!("{}… ({} chars total)", head, count)
  }
}
