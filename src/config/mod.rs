//! Viewer configuration.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ConnectionConfig`] | Endpoint and reconnect settings |
//! | [`PageLocation`] | Hosting page used to derive the default endpoint |

// ============================================================================
// Submodules
// ============================================================================

/// Endpoint and reconnect settings.
pub mod connection;

/// Default endpoint derivation.
pub mod page;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{
    ConnectionConfig, DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_PORT, DEFAULT_RECONNECT_INTERVAL,
    MAX_RECONNECT_DELAY, validate_ws_url,
};
pub use page::{PageLocation, WS_QUERY_PARAM};
