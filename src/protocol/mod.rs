//! WebSocket protocol message types.
//!
//! Messages are ad-hoc JSON objects discriminated by a `type` field.
//!
//! | Message | Direction | Purpose |
//! |---------|-----------|---------|
//! | `frame` | Server → Viewer | Base64 image plus optional stats patch |
//! | `stats` | Server → Viewer | Stats patch |
//! | `status` | Server → Viewer | Informational text |
//! | `request_frame` | Viewer → Server | Handshake sent on open |
//!
//! Pairing payloads are not sent over the socket; they arrive out of band
//! (QR scan) and name the server to connect to.

// ============================================================================
// Submodules
// ============================================================================

/// Inbound server messages.
pub mod message;

/// Outbound client messages.
pub mod outbound;

/// Out-of-band pairing payloads.
pub mod pairing;

// ============================================================================
// Re-exports
// ============================================================================

pub use message::ServerMessage;
pub use outbound::ClientMessage;
pub use pairing::{PAIRING_TYPE, PairingOffer};
