//! Text formatting for the stats panel.

// ============================================================================
// Imports
// ============================================================================

use super::record::FrameStats;

// ============================================================================
// Constants
// ============================================================================

/// Shown for values that have not been set yet.
const PLACEHOLDER: &str = "--";

// ============================================================================
// FormattedStats
// ============================================================================

/// Display strings for each stats panel field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedStats {
    /// e.g. `"15.2"`.
    pub fps: String,
    /// e.g. `"640 x 480"`.
    pub resolution: String,
    /// e.g. `"Edge Detection"`.
    pub mode: String,
    /// Grouped with thousands separators, e.g. `"1,247"`.
    pub frame_count: String,
    /// e.g. `"8.3 ms"`.
    pub processing_time: String,
    /// Local wall-clock time, e.g. `"14:03:27"`.
    pub last_updated: String,
    /// e.g. `"Excellent"`.
    pub connection_quality: String,
}

impl FrameStats {
    /// Formats every field for display.
    #[must_use]
    pub fn formatted(&self) -> FormattedStats {
        FormattedStats {
            fps: self.fps.to_string(),
            resolution: self.resolution.clone(),
            mode: self.mode.label().to_string(),
            frame_count: group_thousands(self.frame_count),
            processing_time: format!("{} ms", self.processing_time_ms),
            last_updated: self
                .last_updated
                .map(|at| at.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            connection_quality: self.connection_quality.label().to_string(),
        }
    }
}

/// Formats `value` with `,` between groups of three digits.
#[must_use]
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::stats::{ConnectionQuality, ViewMode};

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1247), "1,247");
        assert_eq!(group_thousands(1_000_000), "1,000,000");
    }

    #[test]
    fn test_formatted_default() {
        let formatted = FrameStats::default().formatted();
        assert_eq!(formatted.fps, "0");
        assert_eq!(formatted.resolution, "--");
        assert_eq!(formatted.frame_count, "0");
        assert_eq!(formatted.processing_time, "0 ms");
        assert_eq!(formatted.last_updated, "--");
        assert_eq!(formatted.connection_quality, "Disconnected");
    }

    #[test]
    fn test_formatted_values() {
        let stats = FrameStats {
            fps: 15.2,
            resolution: "640 x 480".into(),
            mode: ViewMode::RawFeed,
            frame_count: 12_345,
            processing_time_ms: 8.3,
            last_updated: None,
            connection_quality: ConnectionQuality::Excellent,
        };
        let formatted = stats.formatted();

        assert_eq!(formatted.fps, "15.2");
        assert_eq!(formatted.mode, "Raw Camera Feed");
        assert_eq!(formatted.frame_count, "12,345");
        assert_eq!(formatted.processing_time, "8.3 ms");
        assert_eq!(formatted.connection_quality, "Excellent");
    }

    #[test]
    fn test_formatted_timestamp() {
        let mut stats = FrameStats::default();
        stats.touch();
        let formatted = stats.formatted();
        assert_eq!(formatted.last_updated.len(), 8);
        assert_eq!(formatted.last_updated.matches(':').count(), 2);
    }
}
