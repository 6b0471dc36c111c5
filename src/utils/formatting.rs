//! Formatting utilities used for CLI and log output.

/// Seconds → "02h 25m", rounded to the nearest minute.
pub fn hours_minutes(secs: f64) -> String {
    let total = (secs.abs() / 60.0).round() as u64;
    format!("{:02}h {:02}m", total / 60, total % 60)
}

/// Seconds → "05h 59m (359.9mins)".
pub fn secs2readable(secs: f64) -> String {
    format!("{} ({:.1}mins)", hours_minutes(secs), secs / 60.0)
}

/// Replace every character of a secret with '*'.
pub fn mask(secret: &str) -> String {
    "*".repeat(secret.chars().count())
}
