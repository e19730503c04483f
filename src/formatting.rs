use chrono::{DateTime, Local};
use std::time::SystemTime;

const CTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

pub fn format_optional_time(time: Option<SystemTime>) -> String {
    match time {
        Some(value) => format_system_time(value),
        None => "Unavailable".to_string(),
    }
}

/// Hora local con el formato clásico de `ctime` (`Mon Jan  2 15:04:05 2006`).
pub fn format_system_time(time: SystemTime) -> String {
    let datetime: DateTime<Local> = time.into();
    datetime.format(CTIME_FORMAT).to_string()
}
