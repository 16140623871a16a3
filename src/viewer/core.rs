//! Viewer state machine.
//!
//! [`ViewerCore`] owns the configuration, connection state and stats, and
//! decides what happens next. It performs no I/O itself: opening sockets,
//! sending messages and arming timers are returned as [`Action`]s for the
//! caller to execute. Rendering goes straight to the [`Renderer`].
//!
//! # Phases
//!
//! ```text
//!   connect()            Opened
//! ─────────► Connecting ────────► Connected
//!                │                    │
//!     DialFailed │                    │ Closed
//!                ▼                    ▼
//!            Disconnected ◄───────────┘
//!                │
//!                │ auto_reconnect && attempts < max
//!                ▼
//!      ScheduleReconnect(min(interval * attempts, 30s))
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use tokio::sync::broadcast;
use tracing::{debug, error, info, trace, warn};

use crate::config::ConnectionConfig;
use crate::frame::Frame;
use crate::identifiers::ConnectionId;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::stats::{ConnectionQuality, FrameStats, StatsPatch, arrival_fps, round1};
use crate::transport::{SocketEvent, TransportEvent};

use super::event::ViewerEvent;
use super::render::Renderer;
use super::state::{ConnectionPhase, ConnectionState, ConnectionStatus, StatusLine};

// ============================================================================
// Constants
// ============================================================================

/// Delay before a simulated refresh completes.
pub const REFRESH_DELAY: Duration = Duration::from_millis(500);

// ============================================================================
// Action
// ============================================================================

/// Side effect requested by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Open a new socket. Any previous socket has already been closed.
    Dial {
        /// ID to tag the new socket's events with.
        id: ConnectionId,
        /// Endpoint.
        url: String,
    },

    /// Close a socket.
    Close(ConnectionId),

    /// Send a message on a socket.
    Send {
        /// Target socket.
        id: ConnectionId,
        /// Message to send.
        message: ClientMessage,
    },

    /// Call [`ViewerCore::on_reconnect_due`] with `generation` after `delay`.
    ScheduleReconnect {
        /// Timer generation.
        generation: u64,
        /// Backoff delay.
        delay: Duration,
    },

    /// Call [`ViewerCore::on_refresh_due`] after `delay`.
    ScheduleRefresh {
        /// Refresh delay.
        delay: Duration,
    },
}

// ============================================================================
// ViewerCore
// ============================================================================

/// Reconnect logic, message dispatch and stats bookkeeping.
pub struct ViewerCore {
    config: ConnectionConfig,
    state: ConnectionState,
    stats: FrameStats,
    status: StatusLine,
    renderer: Box<dyn Renderer>,
    events: broadcast::Sender<ViewerEvent>,
    /// Bumped by manual connect/disconnect so older timers become no-ops.
    reconnect_generation: u64,
    demo_frame: Option<Arc<Frame>>,
}

impl ViewerCore {
    /// Creates a disconnected viewer.
    pub fn new(
        config: ConnectionConfig,
        renderer: Box<dyn Renderer>,
        events: broadcast::Sender<ViewerEvent>,
    ) -> Self {
        Self {
            config,
            state: ConnectionState::default(),
            stats: FrameStats::default(),
            status: StatusLine::disconnected(),
            renderer,
            events,
            reconnect_generation: 0,
            demo_frame: None,
        }
    }

    /// Replaces the bundled demo frame.
    pub fn set_demo_frame(&mut self, frame: Frame) {
        self.demo_frame = Some(Arc::new(frame));
    }

    /// Current configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Current connection state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Current stats.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Current status line.
    #[inline]
    #[must_use]
    pub fn status_line(&self) -> &StatusLine {
        &self.status
    }

    /// Connection summary.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        ConnectionStatus {
            connected: self.state.is_connected(),
            url: self.config.url.clone(),
            attempts: self.state.reconnect_attempts,
        }
    }

    /// Current reconnect timer generation.
    #[inline]
    #[must_use]
    pub fn reconnect_generation(&self) -> u64 {
        self.reconnect_generation
    }
}

// ============================================================================
// Control Operations
// ============================================================================

impl ViewerCore {
    /// Shows the demo frame and, if `connect` is set, dials the configured
    /// endpoint.
    pub fn start(&mut self, connect: bool) -> Vec<Action> {
        self.render_status_now();
        self.show_demo_frame();

        if connect {
            self.open_socket()
        } else {
            Vec::new()
        }
    }

    /// Closes any socket, optionally retargets, resets attempts and dials.
    pub fn connect(&mut self, url: Option<String>) -> Vec<Action> {
        if let Some(url) = url {
            info!(%url, "Connection target changed");
            self.config.url = url;
        }

        self.reconnect_generation += 1;
        let mut actions = self.close_socket();
        self.state.reconnect_attempts = 0;
        actions.extend(self.open_socket());
        actions
    }

    /// Disables auto-reconnect and closes the socket. Idempotent.
    pub fn disconnect(&mut self) -> Vec<Action> {
        self.config.auto_reconnect = false;
        self.reconnect_generation += 1;

        let actions = self.close_socket();
        self.set_status(StatusLine::disconnected());
        actions
    }

    /// Enables or disables automatic reconnection.
    pub fn set_auto_reconnect(&mut self, enabled: bool) {
        debug!(enabled, "Auto-reconnect updated");
        self.config.auto_reconnect = enabled;
    }

    /// Displays an externally supplied frame.
    pub fn on_frame(&mut self, data: &str, patch: Option<StatsPatch>) {
        self.apply_frame(data, &patch.unwrap_or_default());
    }

    /// Shows the loading state and arms the refresh timer.
    pub fn refresh_frame(&mut self) -> Vec<Action> {
        self.renderer.show_loading();
        vec![Action::ScheduleRefresh {
            delay: REFRESH_DELAY,
        }]
    }

    /// Completes a simulated refresh with randomized stats.
    pub fn on_refresh_due<G: Rng>(&mut self, rng: &mut G) {
        let increment: u64 = rng.gen_range(1..=10);
        self.stats.frame_count = self.stats.frame_count.saturating_add(increment);
        self.stats.fps = round1(rng.gen_range(12.0..17.0));
        self.stats.processing_time_ms = round1(rng.gen_range(5.0..10.0));
        self.show_demo_frame();
    }

    /// Flips between edge and raw view, then refreshes.
    pub fn toggle_mode(&mut self) -> Vec<Action> {
        self.stats.mode = self.stats.mode.toggled();
        info!(mode = %self.stats.mode, "View mode toggled");
        self.refresh_frame()
    }

    /// Shows the demo frame with demo stats.
    pub fn load_demo(&mut self) {
        self.stats = FrameStats::demo();
        self.show_demo_frame();
    }
}

// ============================================================================
// Event Handling
// ============================================================================

impl ViewerCore {
    /// Handles an event from a socket. Events from replaced sockets are
    /// ignored.
    pub fn on_socket_event(&mut self, event: SocketEvent, now: Instant) -> Vec<Action> {
        let SocketEvent { id, event } = event;

        if !self.state.is_current(id) {
            trace!(%id, ?event, "Ignoring event from stale socket");
            return Vec::new();
        }

        match event {
            TransportEvent::Opened => {
                info!(%id, url = %self.config.url, "Connected to frame server");
                self.state.phase = ConnectionPhase::Connected;
                self.state.reconnect_attempts = 0;
                self.set_status(StatusLine::connected());
                vec![Action::Send {
                    id,
                    message: ClientMessage::RequestFrame,
                }]
            }

            TransportEvent::Message(text) => {
                self.handle_message(&text, now);
                Vec::new()
            }

            TransportEvent::Error(message) => {
                error!(%id, error = %message, "WebSocket error");
                self.state.phase = ConnectionPhase::Disconnected;
                self.set_status(StatusLine::error());
                Vec::new()
            }

            TransportEvent::Closed { code, reason } => {
                info!(%id, ?code, %reason, "WebSocket connection closed");
                self.state.socket = None;
                self.state.phase = ConnectionPhase::Disconnected;
                self.set_status(StatusLine::disconnected());
                self.schedule_reconnect()
            }

            TransportEvent::DialFailed(message) => {
                warn!(%id, url = %self.config.url, error = %message, "Failed to create WebSocket connection");
                self.state.socket = None;
                self.state.phase = ConnectionPhase::Disconnected;
                self.set_status(StatusLine::failed());
                self.schedule_reconnect()
            }
        }
    }

    /// Handles a reconnect timer firing.
    ///
    /// No-op if the timer predates a manual connect/disconnect, if a socket
    /// is already open or dialing, or if auto-reconnect is off.
    pub fn on_reconnect_due(&mut self, generation: u64) -> Vec<Action> {
        if generation != self.reconnect_generation {
            debug!(
                generation,
                current = self.reconnect_generation,
                "Ignoring stale reconnect timer"
            );
            return Vec::new();
        }

        if self.state.socket.is_some() {
            debug!(phase = %self.state.phase, "Reconnect timer fired with socket active");
            return Vec::new();
        }

        if !self.config.auto_reconnect {
            debug!("Reconnect timer fired with auto-reconnect disabled");
            return Vec::new();
        }

        self.open_socket()
    }

    /// Dispatches one text message.
    fn handle_message(&mut self, text: &str, now: Instant) {
        let message = match ServerMessage::parse(text) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Failed to parse WebSocket message");
                return;
            }
        };

        match message {
            ServerMessage::Frame { data, stats } => {
                let measured = arrival_fps(self.state.last_frame_received_at, now);
                self.state.last_frame_received_at = Some(now);

                // Server-supplied fps wins over the arrival rate.
                let mut patch = stats.unwrap_or_default();
                if patch.fps.is_none() {
                    patch.fps = measured;
                }

                self.apply_frame(&data, &patch);
            }

            ServerMessage::Stats(patch) => {
                self.stats.merge(&patch);
                self.stats.touch();
                self.renderer.render_stats(&self.stats);
                self.publish(ViewerEvent::StatsUpdated(self.stats.clone()));
            }

            ServerMessage::Status(data) => {
                info!(status = %data, "Server status");
                self.publish(ViewerEvent::ServerStatus(data));
            }

            ServerMessage::Unknown { kind } => {
                info!(%kind, "Unknown message type");
            }
        }
    }
}

// ============================================================================
// Internals
// ============================================================================

impl ViewerCore {
    fn open_socket(&mut self) -> Vec<Action> {
        let id = ConnectionId::generate();
        self.state = ConnectionState::dialing(id, self.state.reconnect_attempts);
        self.set_status(StatusLine::connecting());

        debug!(%id, url = %self.config.url, attempts = self.state.reconnect_attempts, "Opening socket");

        vec![Action::Dial {
            id,
            url: self.config.url.clone(),
        }]
    }

    fn close_socket(&mut self) -> Vec<Action> {
        let Some(id) = self.state.socket.take() else {
            return Vec::new();
        };

        debug!(%id, "Closing socket");
        self.state.phase = ConnectionPhase::Disconnected;
        self.state.last_frame_received_at = None;
        self.set_status(StatusLine::disconnected());
        vec![Action::Close(id)]
    }

    fn schedule_reconnect(&mut self) -> Vec<Action> {
        if !self.config.auto_reconnect {
            return Vec::new();
        }

        let attempts = self.state.reconnect_attempts;
        if !self.config.allows_retry(attempts) {
            warn!(attempts, "Reconnect attempts exhausted");
            self.publish(ViewerEvent::RetriesExhausted { attempts });
            return Vec::new();
        }

        let attempt = attempts + 1;
        self.state.reconnect_attempts = attempt;
        let delay = self.config.delay_for_attempt(attempt);
        let max_attempts = self.config.max_reconnect_attempts;

        info!(attempt, max_attempts, delay_ms = delay.as_millis() as u64, "Scheduling reconnect");
        self.set_status(StatusLine::reconnecting(delay, attempt, max_attempts));
        self.publish(ViewerEvent::ReconnectScheduled { attempt, delay });

        vec![Action::ScheduleReconnect {
            generation: self.reconnect_generation,
            delay,
        }]
    }

    /// Merges the patch, then counts and renders the frame if it decodes.
    fn apply_frame(&mut self, data: &str, patch: &StatsPatch) {
        self.stats.merge(patch);

        match Frame::from_base64(data) {
            Ok(frame) => {
                if patch.resolution.is_none() {
                    self.stats.resolution = frame.resolution();
                }
                self.stats.touch();
                self.stats.frame_count = self.stats.frame_count.saturating_add(1);

                self.renderer.render_frame(&frame, &self.stats);
                self.publish(ViewerEvent::FrameRendered {
                    frame: Arc::new(frame),
                    stats: self.stats.clone(),
                    demo: false,
                });
            }

            Err(e) => {
                warn!(error = %e, "Failed to load frame image");
                self.stats.touch();
                self.renderer.show_loading();
                self.renderer.render_stats(&self.stats);
                self.publish(ViewerEvent::FrameRejected {
                    reason: e.to_string(),
                });
            }
        }
    }

    fn show_demo_frame(&mut self) {
        let Some(frame) = self.demo_frame() else {
            return;
        };

        self.stats.touch();
        self.renderer.render_frame(&frame, &self.stats);
        self.publish(ViewerEvent::FrameRendered {
            frame,
            stats: self.stats.clone(),
            demo: true,
        });
    }

    fn demo_frame(&mut self) -> Option<Arc<Frame>> {
        if self.demo_frame.is_none() {
            match Frame::demo() {
                Ok(frame) => self.demo_frame = Some(Arc::new(frame)),
                Err(e) => {
                    warn!(error = %e, "Failed to render demo frame");
                    return None;
                }
            }
        }
        self.demo_frame.clone()
    }

    fn set_status(&mut self, status: StatusLine) {
        self.stats.connection_quality = if status.online {
            ConnectionQuality::Excellent
        } else {
            ConnectionQuality::Disconnected
        };

        if self.status == status {
            return;
        }

        self.status = status;
        self.render_status_now();
        self.publish(ViewerEvent::StatusChanged(self.status.clone()));
    }

    fn render_status_now(&mut self) {
        self.renderer.render_status(&self.status);
        self.renderer.render_stats(&self.stats);
    }

    fn publish(&self, event: ViewerEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

// ============================================================================
// Tests
// ============================================================================
