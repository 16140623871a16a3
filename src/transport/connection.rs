//! WebSocket connection and event loop.
//!
//! Each [`Connection`] dials one endpoint and spawns a tokio task that:
//!
//! - Reports the dial outcome ([`TransportEvent::Opened`] or
//!   [`TransportEvent::DialFailed`])
//! - Forwards text messages as [`TransportEvent::Message`]
//! - Reports errors and the final [`TransportEvent::Closed`]
//! - Writes outgoing [`ClientMessage`]s
//!
//! Every event is tagged with the connection's [`ConnectionId`]. A
//! connection never reconnects itself; the viewer opens a new one.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::ConnectionId;
use crate::protocol::ClientMessage;

// ============================================================================
// Constants
// ============================================================================

/// Maximum time to establish the WebSocket handshake.
const DIAL_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Types
// ============================================================================

/// What happened on a socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake completed.
    Opened,

    /// Text message received.
    Message(String),

    /// Transport error. A [`TransportEvent::Closed`] follows.
    Error(String),

    /// Socket closed after having been opened.
    Closed {
        /// Close code, if the peer sent a close frame.
        code: Option<u16>,
        /// Close reason, empty if none.
        reason: String,
    },

    /// The socket never opened.
    DialFailed(String),
}

/// A [`TransportEvent`] tagged with the connection it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketEvent {
    /// Originating connection.
    pub id: ConnectionId,
    /// The event.
    pub event: TransportEvent,
}

/// Channel receiving socket events.
pub type EventSink = mpsc::UnboundedSender<SocketEvent>;

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Write a message.
    Send(ClientMessage),
    /// Close the socket.
    Shutdown,
}

// ============================================================================
// Connection
// ============================================================================

/// Handle to one WebSocket connection.
///
/// Dropping every handle shuts the socket down.
pub struct Connection {
    /// Identifier tagged on every event.
    id: ConnectionId,
    /// Endpoint being dialed.
    url: String,
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
}

impl Connection {
    /// Dials `url` in a spawned task and returns immediately.
    ///
    /// The outcome is reported on `events`. Must be called within a tokio
    /// runtime.
    pub fn open(id: ConnectionId, url: impl Into<String>, events: EventSink) -> Self {
        let url = url.into();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        tokio::spawn(Self::run_event_loop(id, url.clone(), command_rx, events));

        Self {
            id,
            url,
            command_tx,
        }
    }

    /// Returns the connection ID.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the dialed URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Queues a message for sending.
    ///
    /// Messages queued before the socket opens are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the event loop has exited.
    pub fn send(&self, message: ClientMessage) -> Result<()> {
        self.command_tx
            .send(ConnectionCommand::Send(message))
            .map_err(|_| Error::ConnectionClosed)
    }

    /// Closes the socket. No further events are reported.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    /// Returns `true` once the event loop has exited.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop(
        id: ConnectionId,
        url: String,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        events: EventSink,
    ) {
        let emit = |event: TransportEvent| {
            let _ = events.send(SocketEvent { id, event });
        };

        debug!(%id, %url, "Dialing WebSocket");

        let dial = timeout(DIAL_TIMEOUT, connect_async(url.as_str()));
        tokio::pin!(dial);

        let ws_stream = loop {
            tokio::select! {
                result = &mut dial => match result {
                    Ok(Ok((stream, _response))) => break stream,

                    Ok(Err(e)) => {
                        warn!(%id, %url, error = %e, "WebSocket dial failed");
                        emit(TransportEvent::DialFailed(e.to_string()));
                        return;
                    }

                    Err(_) => {
                        let e = Error::connection(format!(
                            "handshake timed out after {}ms",
                            DIAL_TIMEOUT.as_millis()
                        ));
                        warn!(%id, %url, error = %e, "WebSocket dial failed");
                        emit(TransportEvent::DialFailed(e.to_string()));
                        return;
                    }
                },

                command = command_rx.recv() => match command {
                    Some(ConnectionCommand::Send(message)) => {
                        debug!(%id, ?message, "Dropping message queued before open");
                    }

                    Some(ConnectionCommand::Shutdown) | None => {
                        debug!(%id, "Shutdown before socket opened");
                        return;
                    }
                },
            }
        };

        info!(%id, %url, "WebSocket connection established");
        emit(TransportEvent::Opened);

        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Incoming messages from the server
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            trace!(%id, len = text.len(), "Text message received");
                            emit(TransportEvent::Message(text.to_string()));
                        }

                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (Some(u16::from(f.code)), f.reason.to_string()))
                                .unwrap_or((None, String::new()));
                            debug!(%id, ?code, %reason, "WebSocket closed by remote");
                            emit(TransportEvent::Closed { code, reason });
                            break;
                        }

                        Some(Ok(Message::Binary(data))) => {
                            trace!(%id, len = data.len(), "Ignoring binary message");
                        }

                        Some(Err(e)) => {
                            error!(%id, error = %e, "WebSocket error");
                            emit(TransportEvent::Error(e.to_string()));
                            emit(TransportEvent::Closed { code: None, reason: String::new() });
                            break;
                        }

                        None => {
                            debug!(%id, "WebSocket stream ended");
                            emit(TransportEvent::Closed { code: None, reason: String::new() });
                            break;
                        }

                        // Ignore Ping, Pong, raw frames
                        Some(Ok(_)) => {}
                    }
                }

                // Commands from the viewer
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send(message)) => {
                            match message.to_json() {
                                Ok(json) => {
                                    if let Err(e) = ws_write.send(Message::Text(json.into())).await {
                                        warn!(%id, error = %e, "Failed to send message");
                                    }
                                }
                                Err(e) => warn!(%id, error = %e, "Failed to serialize message"),
                            }
                        }

                        Some(ConnectionCommand::Shutdown) | None => {
                            debug!(%id, "Shutdown command received");
                            let _ = ws_write.close().await;
                            break;
                        }
                    }
                }
            }
        }

        debug!(%id, "Event loop terminated");
    }
}

// ============================================================================
// Tests
// ============================================================================
