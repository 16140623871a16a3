//! Outbound client messages.

use serde::Serialize;

use crate::error::Result;

/// A message sent from the viewer to the frame server.
///
/// # Format
///
/// ```json
/// { "type": "request_frame" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Asks the server for a frame. Sent once when the socket opens.
    RequestFrame,
}

impl ClientMessage {
    /// Serializes to the JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_frame_wire_format() {
        let json = ClientMessage::RequestFrame.to_json().expect("serialize");
        assert_eq!(json, r#"{"type":"request_frame"}"#);
    }
}
