//! Human-readable formatting utilities for time and throughput values

use std::time::Duration;

/// Formats a time duration in milliseconds to a human-readable string
pub fn format_duration(millis: u64) -> String {
    if millis == 0 {
        return "0ms".to_string();
    }

    if millis < 1000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        let seconds = millis as f64 / 1000.0;
        if seconds >= 10.0 {
            format!("{:.1}s", seconds)
        } else {
            format!("{:.2}s", seconds)
        }
    } else {
        let total_seconds = millis / 1000;
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;

        if seconds == 0 {
            format!("{}m", minutes)
        } else {
            format!("{}m{}s", minutes, seconds)
        }
    }
}

/// Formats a `Duration` with millisecond precision
pub fn format_duration_precise(duration: Duration) -> String {
    format_duration(duration.as_millis() as u64)
}

/// Formats a throughput in bytes per second
pub fn format_bitrate(bytes_per_second: f64) -> String {
    const UNITS: &[&str] = &["B/s", "KB/s", "MB/s", "GB/s"];
    const THRESHOLD: f64 = 1000.0;

    let mut value = bytes_per_second.max(0.0);
    let mut unit_index = 0;

    while value >= THRESHOLD && unit_index < UNITS.len() - 1 {
        value /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{:.0}{}", value, UNITS[unit_index])
    } else {
        format!("{:.2}{}", value, UNITS[unit_index])
    }
}
