//! Frame statistics record and partial updates.
//!
//! [`StatsPatch`] is what the server sends: any subset of the fields. Merging
//! is a shallow overwrite, so fields absent from the patch keep their values.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

// ============================================================================
// ViewMode
// ============================================================================

/// What the upstream pipeline is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    /// Edge-detected output.
    #[default]
    #[serde(rename = "Edge Detection", alias = "edge", alias = "EdgeDetection")]
    EdgeDetection,

    /// Unprocessed camera feed.
    #[serde(rename = "Raw Camera Feed", alias = "raw", alias = "RawFeed")]
    RawFeed,
}

impl ViewMode {
    /// Returns the other mode.
    #[inline]
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::EdgeDetection => Self::RawFeed,
            Self::RawFeed => Self::EdgeDetection,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::EdgeDetection => "Edge Detection",
            Self::RawFeed => "Raw Camera Feed",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// ConnectionQuality
// ============================================================================

/// Coarse connection indicator shown next to the stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionQuality {
    /// No live connection.
    #[default]
    Disconnected,

    /// Connected to the server.
    Excellent,

    /// Showing bundled demo data.
    #[serde(rename = "Demo Mode", alias = "DemoMode")]
    DemoMode,
}

impl ConnectionQuality {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Excellent => "Excellent",
            Self::DemoMode => "Demo Mode",
        }
    }
}

impl fmt::Display for ConnectionQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// FrameStats
// ============================================================================

/// Live statistics for the frame stream.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStats {
    /// Frames per second.
    pub fps: f64,
    /// Frame resolution, e.g. `"640 x 480"`.
    pub resolution: String,
    /// Current view mode.
    pub mode: ViewMode,
    /// Frames rendered so far.
    pub frame_count: u64,
    /// Upstream processing time per frame in milliseconds.
    pub processing_time_ms: f64,
    /// When the stats last changed.
    pub last_updated: Option<DateTime<Local>>,
    /// Connection indicator.
    pub connection_quality: ConnectionQuality,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            fps: 0.0,
            resolution: "--".to_string(),
            mode: ViewMode::EdgeDetection,
            frame_count: 0,
            processing_time_ms: 0.0,
            last_updated: None,
            connection_quality: ConnectionQuality::Disconnected,
        }
    }
}

impl FrameStats {
    /// Statistics shown alongside the bundled demo frame.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            fps: 15.2,
            resolution: "640 x 480".to_string(),
            mode: ViewMode::EdgeDetection,
            frame_count: 1247,
            processing_time_ms: 8.3,
            last_updated: Some(Local::now()),
            connection_quality: ConnectionQuality::DemoMode,
        }
    }

    /// Applies `patch` field by field.
    pub fn merge(&mut self, patch: &StatsPatch) {
        if let Some(fps) = patch.fps {
            self.fps = fps;
        }
        if let Some(ref resolution) = patch.resolution {
            self.resolution.clone_from(resolution);
        }
        if let Some(mode) = patch.mode {
            self.mode = mode;
        }
        if let Some(frame_count) = patch.frame_count {
            self.frame_count = frame_count;
        }
        if let Some(processing_time_ms) = patch.processing_time_ms {
            self.processing_time_ms = processing_time_ms;
        }
        if let Some(quality) = patch.connection_quality {
            self.connection_quality = quality;
        }
    }

    /// Stamps `last_updated` with the current local time.
    #[inline]
    pub fn touch(&mut self) {
        self.last_updated = Some(Local::now());
    }
}

// ============================================================================
// StatsPatch
// ============================================================================

/// Partial statistics update as sent on the wire.
///
/// `lastUpdated` is not accepted from the server; it is always stamped
/// locally when a patch is applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsPatch {
    /// Frames per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,

    /// Frame resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,

    /// View mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ViewMode>,

    /// Frame counter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_count: Option<u64>,

    /// Processing time in milliseconds.
    #[serde(
        default,
        rename = "processingTime",
        skip_serializing_if = "Option::is_none"
    )]
    pub processing_time_ms: Option<f64>,

    /// Connection indicator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_quality: Option<ConnectionQuality>,
}

impl StatsPatch {
    /// Creates an empty patch.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets fps.
    #[inline]
    #[must_use]
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = Some(fps);
        self
    }

    /// Sets resolution.
    #[inline]
    #[must_use]
    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    /// Sets mode.
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: ViewMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets frame count.
    #[inline]
    #[must_use]
    pub fn with_frame_count(mut self, frame_count: u64) -> Self {
        self.frame_count = Some(frame_count);
        self
    }

    /// Sets processing time.
    #[inline]
    #[must_use]
    pub fn with_processing_time_ms(mut self, ms: f64) -> Self {
        self.processing_time_ms = Some(ms);
        self
    }

    /// Returns `true` if the patch carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ============================================================================
// Tests
// ============================================================================
