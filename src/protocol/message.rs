//! Inbound server messages.
//!
//! # Format
//!
//! ```json
//! { "type": "frame",  "data": "<base64 jpeg>", "stats": { "fps": 15.0 } }
//! { "type": "stats",  "data": { "frameCount": 120, "processingTime": 7.9 } }
//! { "type": "status", "data": "camera started" }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::{Value, from_str, from_value};

use crate::error::{Error, Result};
use crate::stats::StatsPatch;

// ============================================================================
// Envelope
// ============================================================================

/// Raw message shape before dispatch on `type`.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: Option<String>,

    #[serde(default)]
    data: Value,

    #[serde(default)]
    stats: Value,
}

// ============================================================================
// ServerMessage
// ============================================================================

/// A message received from the frame server.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// A new frame, optionally with a stats patch.
    Frame {
        /// Base64 image payload.
        data: String,
        /// Stats carried alongside the frame.
        stats: Option<StatsPatch>,
    },

    /// Stats update without a frame.
    Stats(StatsPatch),

    /// Informational server status.
    Status(Value),

    /// Unrecognised message type.
    Unknown {
        /// The `type` field as received.
        kind: String,
    },
}

impl ServerMessage {
    /// Parses a text message.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if `text` is not a JSON object of the envelope shape
    /// - [`Error::Protocol`] if `type` is missing or the payload for a known
    ///   type has the wrong shape
    pub fn parse(text: &str) -> Result<Self> {
        let envelope: Envelope = from_str(text)?;

        let kind = envelope
            .kind
            .ok_or_else(|| Error::protocol("message has no type"))?;

        match kind.as_str() {
            "frame" => {
                let Value::String(data) = envelope.data else {
                    return Err(Error::protocol("frame data must be a base64 string"));
                };
                let stats = match envelope.stats {
                    Value::Null => None,
                    Value::Object(_) => Some(parse_patch(envelope.stats)?),
                    _ => return Err(Error::protocol("frame stats must be an object")),
                };
                Ok(Self::Frame { data, stats })
            }

            "stats" => {
                if !envelope.data.is_object() {
                    return Err(Error::protocol("stats data must be an object"));
                }
                Ok(Self::Stats(parse_patch(envelope.data)?))
            }

            "status" => Ok(Self::Status(envelope.data)),

            _ => Ok(Self::Unknown { kind }),
        }
    }

    /// The wire `type` of this message.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Frame { .. } => "frame",
            Self::Stats(_) => "stats",
            Self::Status(_) => "status",
            Self::Unknown { kind } => kind,
        }
    }
}

fn parse_patch(value: Value) -> Result<StatsPatch> {
    from_value(value).map_err(|e| Error::protocol(format!("invalid stats patch: {e}")))
}

// ============================================================================
// Tests
// ============================================================================
