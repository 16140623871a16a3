//! WebSocket transport layer.
//!
//! This module dials the frame server and turns socket activity into
//! typed [`TransportEvent`]s.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Viewer (Rust)  │                              │  Camera device  │
//! │                 │         WebSocket            │                 │
//! │  Connection     │─────────────────────────────►│  Frame server   │
//! │  → SocketEvent  │        host:8765             │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Connection::open` - Spawn the dial task
//! 2. `Opened` or `DialFailed` - Dial outcome
//! 3. `Message` - Text messages as they arrive
//! 4. `Closed` - Socket ended (after `Error` when the transport failed)
//! 5. `Connection::shutdown` - Local close, no further events

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, EventSink, SocketEvent, TransportEvent};
