//! Pairing payloads.
//!
//! The camera app can display a QR code containing where its frame server
//! listens. Scanning it yields:
//!
//! ```json
//! { "type": "edgedetector_connection", "expectedServer": "ws://192.168.1.42:8765" }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// `type` value identifying a pairing payload.
pub const PAIRING_TYPE: &str = "edgedetector_connection";

// ============================================================================
// PairingOffer
// ============================================================================

/// Server address offered by the camera device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingOffer {
    /// WebSocket URL of the frame server.
    pub expected_server: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOffer {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    expected_server: Option<String>,
}

impl PairingOffer {
    /// Parses a pairing payload from a JSON value.
    ///
    /// A JSON string value is itself parsed as JSON, since scanners usually
    /// hand over the raw QR text.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the payload is not valid JSON
    /// - [`Error::Protocol`] if it is not a pairing payload or names no server
    pub fn from_value(value: &Value) -> Result<Self> {
        if let Value::String(text) = value {
            return Self::parse(text);
        }

        let raw = RawOffer::deserialize(value)?;
        Self::from_raw(raw)
    }

    /// Parses a pairing payload from JSON text.
    ///
    /// # Errors
    ///
    /// Same as [`PairingOffer::from_value`].
    pub fn parse(text: &str) -> Result<Self> {
        let raw: RawOffer = serde_json::from_str(text)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawOffer) -> Result<Self> {
        if raw.kind != PAIRING_TYPE {
            return Err(Error::protocol(format!(
                "not a pairing payload: type={}",
                raw.kind
            )));
        }

        let expected_server = raw
            .expected_server
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::protocol("pairing payload has no expectedServer"))?;

        Ok(Self { expected_server })
    }
}

// ============================================================================
// Tests
// ============================================================================
