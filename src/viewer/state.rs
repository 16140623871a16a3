//! Connection state and status lines.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::{Duration, Instant};

use crate::identifiers::ConnectionId;

// ============================================================================
// ConnectionPhase
// ============================================================================

/// Reconnect state machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionPhase {
    /// No socket open or being dialed.
    #[default]
    Disconnected,
    /// Socket dialed, handshake pending.
    Connecting,
    /// Socket open.
    Connected,
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        })
    }
}

// ============================================================================
// ConnectionState
// ============================================================================

/// State of the current socket.
///
/// A new value is built for every dial; only the attempt counter carries
/// over.
#[derive(Debug, Clone, Default)]
pub struct ConnectionState {
    /// The active socket, if any.
    pub socket: Option<ConnectionId>,
    /// Current phase.
    pub phase: ConnectionPhase,
    /// Reconnect attempts since the last successful open or manual connect.
    pub reconnect_attempts: u32,
    /// Arrival time of the last frame on this socket.
    pub last_frame_received_at: Option<Instant>,
}

impl ConnectionState {
    /// State for a freshly dialed socket.
    #[must_use]
    pub fn dialing(socket: ConnectionId, reconnect_attempts: u32) -> Self {
        Self {
            socket: Some(socket),
            phase: ConnectionPhase::Connecting,
            reconnect_attempts,
            last_frame_received_at: None,
        }
    }

    /// Returns `true` if the socket is open.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.phase == ConnectionPhase::Connected
    }

    /// Returns `true` if `id` is the active socket.
    #[inline]
    #[must_use]
    pub fn is_current(&self, id: ConnectionId) -> bool {
        self.socket == Some(id)
    }
}

// ============================================================================
// ConnectionStatus
// ============================================================================

/// Snapshot returned by [`crate::ViewerClient::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    /// Socket is open.
    pub connected: bool,
    /// Configured endpoint.
    pub url: String,
    /// Reconnect attempts so far.
    pub attempts: u32,
}

// ============================================================================
// StatusLine
// ============================================================================

/// Connection status text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// Text to display.
    pub message: String,
    /// Online indicator.
    pub online: bool,
}

impl StatusLine {
    fn offline(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            online: false,
        }
    }

    /// `Connecting...`
    #[must_use]
    pub fn connecting() -> Self {
        Self::offline("Connecting...")
    }

    /// `Connected`
    #[must_use]
    pub fn connected() -> Self {
        Self {
            message: "Connected".to_string(),
            online: true,
        }
    }

    /// `Disconnected`
    #[must_use]
    pub fn disconnected() -> Self {
        Self::offline("Disconnected")
    }

    /// `Connection Error`
    #[must_use]
    pub fn error() -> Self {
        Self::offline("Connection Error")
    }

    /// `Connection Failed`
    #[must_use]
    pub fn failed() -> Self {
        Self::offline("Connection Failed")
    }

    /// `Reconnecting in {s}s... ({attempt}/{max})`, seconds rounded up.
    #[must_use]
    pub fn reconnecting(delay: Duration, attempt: u32, max_attempts: u32) -> Self {
        let secs = delay.as_millis().div_ceil(1000);
        Self::offline(format!(
            "Reconnecting in {secs}s... ({attempt}/{max_attempts})"
        ))
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// ============================================================================
// Tests
// ============================================================================
