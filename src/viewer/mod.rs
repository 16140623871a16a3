//! Viewer state machine and runtime.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ViewerClient`] | Cloneable handle to a running viewer |
//! | [`ViewerBuilder`] | Configures and spawns a viewer |
//! | [`ViewerCore`] | I/O-free reconnect and dispatch logic |
//! | [`Renderer`] | Display surface implemented by the embedder |
//! | [`ViewerEvent`] | Notifications for subscribers |
//!
//! # Example
//!
//! ```no_run
//! use edge_viewer::{PageLocation, ViewerClient};
//!
//! # async fn example() -> edge_viewer::Result<()> {
//! let page = PageLocation::parse("http://192.168.1.20/viewer")?;
//! let viewer = ViewerClient::builder().page(&page).spawn()?;
//!
//! viewer.toggle_mode()?;
//! println!("{:?}", viewer.status());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Viewer handle and runtime task.
pub mod client;

/// Reconnect and dispatch state machine.
pub mod core;

/// Subscriber notifications.
pub mod event;

/// Display surface abstraction.
pub mod render;

/// Connection state and status lines.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{DEFAULT_EVENT_CAPACITY, ViewerBuilder, ViewerClient};
pub use core::{Action, REFRESH_DELAY, ViewerCore};
pub use event::ViewerEvent;
pub use render::{LogRenderer, NullRenderer, Renderer};
pub use state::{ConnectionPhase, ConnectionState, ConnectionStatus, StatusLine};
