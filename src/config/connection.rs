//! Connection configuration and reconnect backoff.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use edge_viewer::ConnectionConfig;
//!
//! let config = ConnectionConfig::new("ws://192.168.1.100:8765")
//!     .with_reconnect_interval(Duration::from_secs(2))
//!     .with_max_reconnect_attempts(3);
//!
//! assert_eq!(config.delay_for_attempt(1), Duration::from_secs(2));
//! assert_eq!(config.delay_for_attempt(3), Duration::from_secs(6));
//! assert!(!config.allows_retry(3));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Port the camera-side server listens on.
pub const DEFAULT_PORT: u16 = 8765;

/// Base delay between reconnect attempts.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(5000);

/// Automatic reconnects stop after this many attempts.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Upper bound for any single backoff delay.
pub const MAX_RECONNECT_DELAY: Duration = Duration::from_millis(30_000);

// ============================================================================
// ConnectionConfig
// ============================================================================

/// Where to connect and how to retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// WebSocket endpoint (`ws://` or `wss://`).
    pub url: String,

    /// Reconnect automatically after a close or failed dial.
    pub auto_reconnect: bool,

    /// Linear backoff step.
    pub reconnect_interval: Duration,

    /// Attempts allowed before automatic reconnection gives up.
    pub max_reconnect_attempts: u32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new(format!("ws://localhost:{DEFAULT_PORT}"))
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl ConnectionConfig {
    /// Creates a configuration for `url` with default retry settings.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auto_reconnect: true,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ConnectionConfig {
    /// Sets the endpoint URL.
    #[inline]
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Enables or disables automatic reconnection.
    #[inline]
    #[must_use]
    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    /// Sets the backoff step.
    #[inline]
    #[must_use]
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Sets the retry limit.
    #[inline]
    #[must_use]
    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }
}

// ============================================================================
// Backoff
// ============================================================================

impl ConnectionConfig {
    /// Delay before reconnect attempt `attempt` (1-based).
    ///
    /// `min(interval * attempt, 30s)`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.reconnect_interval
            .saturating_mul(attempt)
            .min(MAX_RECONNECT_DELAY)
    }

    /// Returns `true` if another automatic attempt may be scheduled after
    /// `attempts` have already been made.
    #[inline]
    #[must_use]
    pub fn allows_retry(&self, attempts: u32) -> bool {
        self.auto_reconnect && attempts < self.max_reconnect_attempts
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Parses `url` and checks that it is a WebSocket endpoint.
///
/// Surrounding whitespace is trimmed.
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] if the URL does not parse, uses a scheme
/// other than `ws`/`wss`, or has no host.
pub fn validate_ws_url(url: &str) -> Result<Url> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_url(url, "URL is empty"));
    }

    let parsed = Url::parse(trimmed).map_err(|e| Error::invalid_url(trimmed, e.to_string()))?;

    if !matches!(parsed.scheme(), "ws" | "wss") {
        return Err(Error::invalid_url(trimmed, "scheme must be ws or wss"));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(Error::invalid_url(trimmed, "missing host"));
    }

    Ok(parsed)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_defaults() {
        let config = ConnectionConfig::default();
        assert_eq!(config.url, "ws://localhost:8765");
        assert!(config.auto_reconnect);
        assert_eq!(config.reconnect_interval, Duration::from_millis(5000));
        assert_eq!(config.max_reconnect_attempts, 10);
    }

    #[test]
    fn test_builder_methods() {
        let config = ConnectionConfig::default()
            .with_url("ws://h:1")
            .with_auto_reconnect(false)
            .with_reconnect_interval(Duration::from_millis(100))
            .with_max_reconnect_attempts(2);

        assert_eq!(config.url, "ws://h:1");
        assert!(!config.auto_reconnect);
        assert_eq!(config.reconnect_interval, Duration::from_millis(100));
        assert_eq!(config.max_reconnect_attempts, 2);
    }

    #[test]
    fn test_delay_sequence() {
        let config = ConnectionConfig::default().with_max_reconnect_attempts(3);
        let delays: Vec<u128> = (1..=3)
            .map(|n| config.delay_for_attempt(n).as_millis())
            .collect();
        assert_eq!(delays, vec![5000, 10000, 15000]);
    }

    #[test]
    fn test_delay_is_capped() {
        let config = ConnectionConfig::default();
        assert_eq!(config.delay_for_attempt(6), MAX_RECONNECT_DELAY);
        assert_eq!(config.delay_for_attempt(u32::MAX), MAX_RECONNECT_DELAY);
    }

    #[test]
    fn test_allows_retry() {
        let config = ConnectionConfig::default().with_max_reconnect_attempts(3);
        assert!(config.allows_retry(0));
        assert!(config.allows_retry(2));
        assert!(!config.allows_retry(3));
        assert!(!config.with_auto_reconnect(false).allows_retry(0));
    }

    #[test]
    fn test_validate_ws_url() {
        assert!(validate_ws_url("ws://192.168.1.100:8765").is_ok());
        assert!(validate_ws_url("  wss://example.com/stream ").is_ok());
        assert!(validate_ws_url("").is_err());
        assert!(validate_ws_url("http://example.com").is_err());
        assert!(validate_ws_url("example.com:8765").is_err());
    }

    proptest! {
        #[test]
        fn prop_delay_matches_formula(interval_ms in 0u64..60_000, attempt in 1u32..1_000) {
            let config = ConnectionConfig::default()
                .with_reconnect_interval(Duration::from_millis(interval_ms));
            let expected = (interval_ms * u64::from(attempt)).min(30_000);
            prop_assert_eq!(config.delay_for_attempt(attempt).as_millis(), u128::from(expected));
        }
    }
}
