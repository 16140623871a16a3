//! Notifications published to subscribers.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::frame::Frame;
use crate::stats::FrameStats;

use super::state::StatusLine;

/// Something observable happened in the viewer.
///
/// Delivered through [`crate::ViewerClient::subscribe`]. Slow subscribers
/// may miss events (broadcast semantics).
#[derive(Debug, Clone)]
pub enum ViewerEvent {
    /// Status line changed.
    StatusChanged(StatusLine),

    /// A frame was displayed.
    FrameRendered {
        /// The frame.
        frame: Arc<Frame>,
        /// Stats after the frame was counted.
        stats: FrameStats,
        /// The bundled demo frame rather than a received one.
        demo: bool,
    },

    /// A frame payload could not be decoded.
    FrameRejected {
        /// Why decoding failed.
        reason: String,
    },

    /// Stats changed without a new frame.
    StatsUpdated(FrameStats),

    /// An automatic reconnect was scheduled.
    ReconnectScheduled {
        /// Attempt number (1-based).
        attempt: u32,
        /// Delay before the attempt.
        delay: Duration,
    },

    /// Automatic reconnection gave up.
    RetriesExhausted {
        /// Attempts made.
        attempts: u32,
    },

    /// Server sent a `status` message.
    ServerStatus(Value),
}
