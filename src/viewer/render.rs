//! Display surface abstraction.
//!
//! The viewer does not own any layout. Whatever embeds it implements
//! [`Renderer`] to put frames, stats and status text on screen.

// ============================================================================
// Imports
// ============================================================================

use tracing::info;

use crate::frame::Frame;
use crate::stats::FrameStats;

use super::state::StatusLine;

// ============================================================================
// Renderer
// ============================================================================

/// Receives display updates from the viewer task.
///
/// Calls arrive on the viewer task in order; implementations should return
/// quickly.
pub trait Renderer: Send {
    /// Shows `frame` together with the stats it produced.
    fn render_frame(&mut self, frame: &Frame, stats: &FrameStats);

    /// Refreshes the stats panel only.
    fn render_stats(&mut self, stats: &FrameStats);

    /// Updates the connection status indicator.
    fn render_status(&mut self, status: &StatusLine);

    /// Hides the frame and shows a loading indicator.
    fn show_loading(&mut self) {}
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render_frame(&mut self, frame: &Frame, stats: &FrameStats) {
        (**self).render_frame(frame, stats);
    }

    fn render_stats(&mut self, stats: &FrameStats) {
        (**self).render_stats(stats);
    }

    fn render_status(&mut self, status: &StatusLine) {
        (**self).render_status(status);
    }

    fn show_loading(&mut self) {
        (**self).show_loading();
    }
}

// ============================================================================
// NullRenderer
// ============================================================================

/// Discards every update. Useful when only [`crate::ViewerEvent`]s matter.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render_frame(&mut self, _frame: &Frame, _stats: &FrameStats) {}

    fn render_stats(&mut self, _stats: &FrameStats) {}

    fn render_status(&mut self, _status: &StatusLine) {}
}

// ============================================================================
// LogRenderer
// ============================================================================

/// Writes every update to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRenderer;

impl Renderer for LogRenderer {
    fn render_frame(&mut self, frame: &Frame, stats: &FrameStats) {
        let shown = stats.formatted();
        info!(
            format = frame.format().mime_type(),
            size = frame.bytes().len(),
            resolution = %frame.resolution(),
            frame_count = %shown.frame_count,
            fps = %shown.fps,
            "Frame"
        );
    }

    fn render_stats(&mut self, stats: &FrameStats) {
        let shown = stats.formatted();
        info!(
            fps = %shown.fps,
            resolution = %shown.resolution,
            mode = %shown.mode,
            frame_count = %shown.frame_count,
            processing = %shown.processing_time,
            updated = %shown.last_updated,
            quality = %shown.connection_quality,
            "Stats"
        );
    }

    fn render_status(&mut self, status: &StatusLine) {
        info!(online = status.online, "{}", status.message);
    }

    fn show_loading(&mut self) {
        info!("Loading frame...");
    }
}
