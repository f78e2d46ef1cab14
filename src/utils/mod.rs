//! Shared error type, logging setup, evaluation metrics and console formatting

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{Result, SignLangError};
pub use logging::{init_logging, LogConfig, TrainingLogger};
pub use metrics::{ConfusionMatrix, Metrics};

/// `42.0` -> `42.0s`, `95.0` -> `1m 35s`, `3700.0` -> `1h 1m`
pub fn format_duration(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    if seconds < 60.0 {
        return format!("{:.1}s", seconds);
    }
    let whole = seconds.round() as u64;
    let (hours, minutes, secs) = (whole / 3600, (whole % 3600) / 60, whole % 60);
    if hours == 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}h {}m", hours, minutes)
    }
}

/// Horizontal bar for a fraction in `[0, 1]`, used by `signlang stats`
pub fn format_progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(12.34), "12.3s");
        assert_eq!(format_duration(95.0), "1m 35s");
        assert_eq!(format_duration(3700.0), "1h 1m");
        assert_eq!(format_duration(-1.0), "0.0s");
    }

    #[test]
    fn test_format_progress_bar() {
        assert_eq!(format_progress_bar(0.5, 10), "█████░░░░░");
        assert_eq!(format_progress_bar(2.0, 4), "████");
        assert_eq!(format_progress_bar(0.0, 3), "░░░");
    }
}
