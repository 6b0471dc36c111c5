//! Time utilities: conversions between config values and std durations.

use chrono::{DateTime, Local};
use std::time::Duration;

/// Seconds → `Duration`. Negative and NaN clamp to zero, overflow saturates.
pub fn secs_f64(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

pub fn minutes_f64(mins: f64) -> Duration {
    secs_f64(mins * 60.0)
}

/// Wall-clock seconds between `start` and now, never negative.
pub fn seconds_since(start: DateTime<Local>) -> f64 {
    let delta = Local::now() - start;
    (delta.num_milliseconds() as f64 / 1000.0).max(0.0)
}

pub fn format_timestamp(ts: DateTime<Local>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}
