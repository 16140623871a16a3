//! Edge Viewer - WebSocket client for a live edge-detection camera feed.
//!
//! This library connects to a frame server, keeps the connection alive
//! with linear backoff, and turns incoming messages into frames and
//! statistics for whatever display surface embeds it.
//!
//! # Architecture
//!
//! The viewer follows a handle/task model:
//!
//! - **Handle ([`ViewerClient`])**: Cloneable, forwards commands
//! - **Task**: Owns the [`ViewerCore`] state machine, the socket and timers
//! - **Display ([`Renderer`])**: Implemented by the embedder
//!
//! Key design principles:
//!
//! - One socket at a time, every socket tagged with a [`ConnectionId`]
//! - Reconnect delay grows linearly and is capped at 30 seconds
//! - Malformed messages are dropped, never fatal
//! - A demo frame is shown until live frames arrive
//!
//! # Quick Start
//!
//! ```no_run
//! use edge_viewer::{LogRenderer, Result, ViewerClient, ViewerEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let viewer = ViewerClient::builder()
//!         .url("ws://192.168.1.20:8765")
//!         .renderer(LogRenderer)
//!         .spawn()?;
//!
//!     let mut events = viewer.subscribe();
//!     while let Ok(event) = events.recv().await {
//!         if let ViewerEvent::FrameRendered { stats, .. } = event {
//!             println!("frame {} at {} fps", stats.frame_count, stats.fps);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Endpoint and reconnect settings |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`frame`] | Decoded frames and the demo frame |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | WebSocket message types |
//! | [`stats`] | Frame statistics record |
//! | [`transport`] | WebSocket transport layer (internal) |
//! | [`viewer`] | State machine, runtime and display abstraction |

// ============================================================================
// Modules
// ============================================================================

/// Endpoint and reconnect settings.
///
/// Use [`ConnectionConfig`] directly or through [`ViewerBuilder`].
pub mod config;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Decoded frames.
pub mod frame;

/// Type-safe identifiers.
pub mod identifiers;

/// WebSocket protocol message types.
///
/// Inbound `frame`/`stats`/`status` messages, the outbound handshake and
/// pairing payloads.
pub mod protocol;

/// Frame statistics.
pub mod stats;

/// WebSocket transport layer.
///
/// Internal module dialing the server and reporting socket events.
pub mod transport;

/// Viewer state machine and runtime.
pub mod viewer;

// ============================================================================
// Re-exports
// ============================================================================

// Config types
pub use config::{ConnectionConfig, PageLocation};

// Error types
pub use error::{Error, Result};

// Frame types
pub use frame::{Frame, FrameFormat};

// Identifier types
pub use identifiers::ConnectionId;

// Protocol types
pub use protocol::{ClientMessage, PairingOffer, ServerMessage};

// Stats types
pub use stats::{ConnectionQuality, FormattedStats, FrameStats, StatsPatch, ViewMode};

// Viewer types
pub use viewer::{
    ConnectionStatus, LogRenderer, NullRenderer, Renderer, StatusLine, ViewerBuilder,
    ViewerClient, ViewerCore, ViewerEvent,
};
