//! Viewer handle and runtime task.
//!
//! [`ViewerClient::builder`] configures a viewer and spawns a tokio task
//! that owns the [`ViewerCore`], the live socket and the timers. The
//! returned [`ViewerClient`] is a cheap, cloneable handle that forwards
//! commands to that task.
//!
//! # Example
//!
//! ```no_run
//! use edge_viewer::{LogRenderer, ViewerClient};
//!
//! # async fn example() -> edge_viewer::Result<()> {
//! let viewer = ViewerClient::builder()
//!     .url("ws://192.168.1.20:8765")
//!     .renderer(LogRenderer)
//!     .spawn()?;
//!
//! let mut events = viewer.subscribe();
//! while let Ok(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::config::{ConnectionConfig, PageLocation, validate_ws_url};
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::protocol::PairingOffer;
use crate::stats::{FrameStats, StatsPatch};
use crate::transport::{Connection, SocketEvent};

use super::core::{Action, ViewerCore};
use super::event::ViewerEvent;
use super::render::{NullRenderer, Renderer};
use super::state::ConnectionStatus;

// ============================================================================
// Constants
// ============================================================================

/// Default capacity of the event broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

// ============================================================================
// Types
// ============================================================================

/// Commands forwarded to the runtime task.
enum ViewerCommand {
    Connect(Option<String>),
    Disconnect,
    SetAutoReconnect(bool),
    PushFrame {
        data: String,
        stats: Option<StatsPatch>,
    },
    RefreshFrame,
    ToggleMode,
    LoadDemo,
    Shutdown,
}

/// Timer expirations delivered back to the runtime task.
#[derive(Debug, Clone, Copy)]
enum TimerFired {
    Reconnect(u64),
    Refresh,
}

/// State published after every input the task processes.
#[derive(Debug, Clone)]
struct Snapshot {
    status: ConnectionStatus,
    stats: FrameStats,
}

// ============================================================================
// ViewerBuilder
// ============================================================================

/// Builder for a [`ViewerClient`].
///
/// Use [`ViewerClient::builder()`] to create one.
pub struct ViewerBuilder {
    config: ConnectionConfig,
    renderer: Option<Box<dyn Renderer>>,
    demo_frame: Option<Frame>,
    connect_on_start: bool,
    event_capacity: usize,
}

impl Default for ViewerBuilder {
    fn default() -> Self {
        Self {
            config: ConnectionConfig::default(),
            renderer: None,
            demo_frame: None,
            connect_on_start: true,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ViewerBuilder {
    /// Creates a builder with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole connection configuration.
    #[inline]
    #[must_use]
    pub fn config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the endpoint.
    #[inline]
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    /// Derives the endpoint from the hosting page.
    ///
    /// A `ws` query parameter wins; otherwise the page host on port 8765
    /// is used.
    #[inline]
    #[must_use]
    pub fn page(mut self, page: &PageLocation) -> Self {
        self.config.url = page.ws_url();
        self
    }

    /// Enables or disables automatic reconnection.
    #[inline]
    #[must_use]
    pub fn auto_reconnect(mut self, enabled: bool) -> Self {
        self.config.auto_reconnect = enabled;
        self
    }

    /// Sets the base reconnect interval.
    #[inline]
    #[must_use]
    pub fn reconnect_interval(mut self, interval: Duration) -> Self {
        self.config.reconnect_interval = interval;
        self
    }

    /// Sets the automatic reconnect cap.
    #[inline]
    #[must_use]
    pub fn max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.config.max_reconnect_attempts = attempts;
        self
    }

    /// Sets the display surface. Defaults to [`NullRenderer`].
    #[inline]
    #[must_use]
    pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Replaces the bundled demo frame.
    #[inline]
    #[must_use]
    pub fn demo_frame(mut self, frame: Frame) -> Self {
        self.demo_frame = Some(frame);
        self
    }

    /// Whether to dial as soon as the task starts. Defaults to `true`.
    #[inline]
    #[must_use]
    pub fn connect_on_start(mut self, connect: bool) -> Self {
        self.connect_on_start = connect;
        self
    }

    /// Sets the event channel capacity.
    #[inline]
    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Validates the configuration and spawns the viewer task.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if the endpoint is not a `ws`/`wss` URL
    /// - [`Error::Config`] if the event capacity is zero or no tokio
    ///   runtime is running
    pub fn spawn(self) -> Result<ViewerClient> {
        self.validate()?;

        let Self {
            config,
            renderer,
            demo_frame,
            connect_on_start,
            event_capacity,
        } = self;

        let (events, _) = broadcast::channel(event_capacity);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (socket_tx, socket_rx) = mpsc::unbounded_channel();
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();

        let renderer = renderer.unwrap_or_else(|| Box::new(NullRenderer));
        let mut core = ViewerCore::new(config, renderer, events.clone());
        if let Some(frame) = demo_frame {
            core.set_demo_frame(frame);
        }

        let shared = Arc::new(Mutex::new(Snapshot {
            status: core.status(),
            stats: core.stats().clone(),
        }));

        info!(url = %core.config().url, connect_on_start, "Starting viewer");

        let task = ViewerTask {
            core,
            socket: None,
            socket_tx,
            timer_tx,
            shared: Arc::clone(&shared),
            rng: StdRng::from_entropy(),
        };
        tokio::spawn(task.run(command_rx, socket_rx, timer_rx, connect_on_start));

        Ok(ViewerClient {
            command_tx,
            shared,
            events,
        })
    }

    fn validate(&self) -> Result<()> {
        validate_ws_url(&self.config.url)?;

        if self.event_capacity == 0 {
            return Err(Error::config("event capacity must be non-zero"));
        }

        if tokio::runtime::Handle::try_current().is_err() {
            return Err(Error::config(
                "the viewer must be spawned from within a tokio runtime",
            ));
        }

        Ok(())
    }
}

// ============================================================================
// ViewerClient
// ============================================================================

/// Handle to a running viewer.
///
/// Commands are queued to the viewer task and take effect asynchronously;
/// [`status`](Self::status) and [`stats`](Self::stats) reflect the last
/// input the task processed. The task stops when [`shutdown`](Self::shutdown)
/// is called or every handle is dropped.
#[derive(Clone)]
pub struct ViewerClient {
    command_tx: mpsc::UnboundedSender<ViewerCommand>,
    shared: Arc<Mutex<Snapshot>>,
    events: broadcast::Sender<ViewerEvent>,
}

impl ViewerClient {
    /// Creates a builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Closes any socket, optionally retargets, and dials with the attempt
    /// counter reset.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if `url` is not a `ws`/`wss` URL
    /// - [`Error::ViewerStopped`] if the viewer task has exited
    pub fn connect(&self, url: Option<&str>) -> Result<()> {
        let url = match url {
            Some(url) => {
                validate_ws_url(url)?;
                Some(url.trim().to_string())
            }
            None => None,
        };
        self.send(ViewerCommand::Connect(url))
    }

    /// Disables auto-reconnect and closes the socket.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ViewerStopped`] if the viewer task has exited.
    pub fn disconnect(&self) -> Result<()> {
        self.send(ViewerCommand::Disconnect)
    }

    /// Enables or disables automatic reconnection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ViewerStopped`] if the viewer task has exited.
    pub fn set_auto_reconnect(&self, enabled: bool) -> Result<()> {
        self.send(ViewerCommand::SetAutoReconnect(enabled))
    }

    /// Displays an externally supplied base64 frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ViewerStopped`] if the viewer task has exited.
    pub fn on_frame(&self, data: impl Into<String>, stats: Option<StatsPatch>) -> Result<()> {
        self.send(ViewerCommand::PushFrame {
            data: data.into(),
            stats,
        })
    }

    /// Shows the loading state, then a refreshed demo frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ViewerStopped`] if the viewer task has exited.
    pub fn refresh_frame(&self) -> Result<()> {
        self.send(ViewerCommand::RefreshFrame)
    }

    /// Switches between edge and raw view.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ViewerStopped`] if the viewer task has exited.
    pub fn toggle_mode(&self) -> Result<()> {
        self.send(ViewerCommand::ToggleMode)
    }

    /// Shows the demo frame with demo stats.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ViewerStopped`] if the viewer task has exited.
    pub fn load_demo(&self) -> Result<()> {
        self.send(ViewerCommand::LoadDemo)
    }

    /// Connects to the server named by a pairing payload.
    ///
    /// Payloads that are not pairing offers are logged and ignored.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if the offered server is not a `ws`/`wss` URL
    /// - [`Error::ViewerStopped`] if the viewer task has exited
    pub fn handle_pairing(&self, payload: &Value) -> Result<()> {
        match PairingOffer::from_value(payload) {
            Ok(offer) => {
                info!(server = %offer.expected_server, "Pairing offer received");
                self.connect(Some(&offer.expected_server))
            }
            Err(e) => {
                warn!(error = %e, "Ignoring pairing payload");
                Ok(())
            }
        }
    }

    /// Connection summary as of the last processed input.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.shared.lock().status.clone()
    }

    /// Stats as of the last processed input.
    #[must_use]
    pub fn stats(&self) -> FrameStats {
        self.shared.lock().stats.clone()
    }

    /// Subscribes to viewer events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ViewerEvent> {
        self.events.subscribe()
    }

    /// Stops the viewer task and closes the socket.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ViewerCommand::Shutdown);
    }

    /// Returns `true` while the viewer task is running.
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.command_tx.is_closed()
    }

    fn send(&self, command: ViewerCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| Error::ViewerStopped)
    }
}

// ============================================================================
// ViewerTask
// ============================================================================

/// Runtime task executing [`Action`]s for the core.
struct ViewerTask {
    core: ViewerCore,
    socket: Option<Connection>,
    socket_tx: mpsc::UnboundedSender<SocketEvent>,
    timer_tx: mpsc::UnboundedSender<TimerFired>,
    shared: Arc<Mutex<Snapshot>>,
    rng: StdRng,
}

impl ViewerTask {
    async fn run(
        mut self,
        mut command_rx: mpsc::UnboundedReceiver<ViewerCommand>,
        mut socket_rx: mpsc::UnboundedReceiver<SocketEvent>,
        mut timer_rx: mpsc::UnboundedReceiver<TimerFired>,
        connect_on_start: bool,
    ) {
        let actions = self.core.start(connect_on_start);
        self.execute(actions);
        self.publish_snapshot();

        loop {
            let actions = tokio::select! {
                command = command_rx.recv() => match command {
                    Some(ViewerCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },

                Some(event) = socket_rx.recv() => {
                    self.core.on_socket_event(event, Instant::now())
                }

                Some(timer) = timer_rx.recv() => match timer {
                    TimerFired::Reconnect(generation) => self.core.on_reconnect_due(generation),
                    TimerFired::Refresh => {
                        self.core.on_refresh_due(&mut self.rng);
                        Vec::new()
                    }
                },
            };

            self.execute(actions);
            self.publish_snapshot();
        }

        if let Some(connection) = self.socket.take() {
            connection.shutdown();
        }
        debug!("Viewer task terminated");
    }

    fn handle_command(&mut self, command: ViewerCommand) -> Vec<Action> {
        match command {
            ViewerCommand::Connect(url) => self.core.connect(url),
            ViewerCommand::Disconnect => self.core.disconnect(),
            ViewerCommand::SetAutoReconnect(enabled) => {
                self.core.set_auto_reconnect(enabled);
                Vec::new()
            }
            ViewerCommand::PushFrame { data, stats } => {
                self.core.on_frame(&data, stats);
                Vec::new()
            }
            ViewerCommand::RefreshFrame => self.core.refresh_frame(),
            ViewerCommand::ToggleMode => self.core.toggle_mode(),
            ViewerCommand::LoadDemo => {
                self.core.load_demo();
                Vec::new()
            }
            // Handled by the run loop.
            ViewerCommand::Shutdown => Vec::new(),
        }
    }

    fn execute(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::Dial { id, url } => {
                    if let Some(previous) = self.socket.take() {
                        previous.shutdown();
                    }
                    self.socket = Some(Connection::open(id, url, self.socket_tx.clone()));
                }

                Action::Close(id) => {
                    if let Some(connection) = self.socket.take_if(|c| c.id() == id) {
                        connection.shutdown();
                    }
                }

                Action::Send { id, message } => {
                    let Some(connection) = self.socket.as_ref().filter(|c| c.id() == id) else {
                        debug!(%id, ?message, "Dropping message for inactive socket");
                        continue;
                    };
                    if let Err(e) = connection.send(message) {
                        warn!(%id, error = %e, "Failed to queue message");
                    }
                }

                Action::ScheduleReconnect { generation, delay } => {
                    self.arm_timer(delay, TimerFired::Reconnect(generation));
                }

                Action::ScheduleRefresh { delay } => {
                    self.arm_timer(delay, TimerFired::Refresh);
                }
            }
        }
    }

    fn arm_timer(&self, delay: Duration, timer: TimerFired) {
        let timer_tx = self.timer_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = timer_tx.send(timer);
        });
    }

    fn publish_snapshot(&self) {
        let mut shared = self.shared.lock();
        shared.status = self.core.status();
        shared.stats.clone_from(self.core.stats());
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use futures_util::{SinkExt, StreamExt};
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::Message;

    use crate::config::DEFAULT_MAX_RECONNECT_ATTEMPTS;

    #[test]
    fn test_builder_defaults() {
        let builder = ViewerBuilder::new();
        assert_eq!(builder.config, ConnectionConfig::default());
        assert!(builder.connect_on_start);
        assert_eq!(builder.event_capacity, DEFAULT_EVENT_CAPACITY);
        assert!(builder.renderer.is_none());
    }

    #[test]
    fn test_builder_setters() {
        let builder = ViewerClient::builder()
            .url("ws://h:1")
            .auto_reconnect(false)
            .reconnect_interval(Duration::from_millis(20))
            .max_reconnect_attempts(3)
            .connect_on_start(false);

        assert_eq!(builder.config.url, "ws://h:1");
        assert!(!builder.config.auto_reconnect);
        assert_eq!(builder.config.reconnect_interval, Duration::from_millis(20));
        assert_eq!(builder.config.max_reconnect_attempts, 3);
        assert!(!builder.connect_on_start);
    }

    #[test]
    fn test_builder_page() {
        let page = PageLocation::parse("https://cam.local/viewer").expect("page");
        let builder = ViewerBuilder::new().page(&page);
        assert_eq!(builder.config.url, "wss://cam.local:8765");
        assert_eq!(
            builder.config.max_reconnect_attempts,
            DEFAULT_MAX_RECONNECT_ATTEMPTS
        );
    }

    #[test]
    fn test_spawn_outside_runtime_is_rejected() {
        let err = ViewerBuilder::new().spawn().err().expect("error");
        assert!(matches!(err, Error::Config { .. }));
    }

    #[tokio::test]
    async fn test_spawn_rejects_bad_url() {
        let err = ViewerBuilder::new().url("http://h").spawn().err().expect("error");
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_spawn_rejects_zero_capacity() {
        let err = ViewerBuilder::new().event_capacity(0).spawn().err().expect("error");
        assert!(matches!(err, Error::Config { .. }));
    }

    #[tokio::test]
    async fn test_shutdown_stops_task() {
        let viewer = ViewerBuilder::new()
            .connect_on_start(false)
            .demo_frame(Frame::demo_with_size(4, 4).expect("frame"))
            .spawn()
            .expect("spawn");
        assert!(viewer.is_running());

        viewer.shutdown();
        tokio::time::timeout(Duration::from_secs(2), async {
            while viewer.is_running() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("task stopped");

        assert!(matches!(viewer.toggle_mode(), Err(Error::ViewerStopped)));
    }

    #[tokio::test]
    async fn test_connect_validates_url() {
        let viewer = ViewerBuilder::new()
            .connect_on_start(false)
            .demo_frame(Frame::demo_with_size(4, 4).expect("frame"))
            .spawn()
            .expect("spawn");

        assert!(matches!(
            viewer.connect(Some("not a url")),
            Err(Error::InvalidUrl { .. })
        ));
        viewer.shutdown();
    }

    #[tokio::test]
    async fn test_non_pairing_payload_is_ignored() {
        let viewer = ViewerBuilder::new()
            .connect_on_start(false)
            .demo_frame(Frame::demo_with_size(4, 4).expect("frame"))
            .spawn()
            .expect("spawn");

        let payload = serde_json::json!({"type": "something_else"});
        assert!(viewer.handle_pairing(&payload).is_ok());
        viewer.shutdown();
    }

    // ------------------------------------------------------------------------
    // Live sessions
    // ------------------------------------------------------------------------

    async fn next_matching<F>(rx: &mut broadcast::Receiver<ViewerEvent>, mut pred: F) -> ViewerEvent
    where
        F: FnMut(&ViewerEvent) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match rx.recv().await {
                    Ok(event) if pred(&event) => return event,
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => panic!("event channel closed"),
                }
            }
        })
        .await
        .expect("timed out waiting for event")
    }

    /// Waits until the published snapshot satisfies `pred`.
    async fn eventually<F>(viewer: &ViewerClient, pred: F)
    where
        F: Fn(&ViewerClient) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !pred(viewer) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("timed out waiting for snapshot");
    }

    fn quiet_viewer(url: String) -> ViewerBuilder {
        ViewerBuilder::new()
            .url(url)
            .connect_on_start(false)
            .demo_frame(Frame::demo_with_size(4, 4).expect("frame"))
    }

    #[tokio::test]
    async fn test_session_handshake_frame_and_stats() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let payload = Frame::demo_with_size(16, 12).expect("frame").to_base64();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut ws = tokio_tungstenite::accept_async(stream).await.expect("upgrade");

            let handshake = ws.next().await.expect("message").expect("ok");
            assert_eq!(handshake.to_text().expect("text"), r#"{"type":"request_frame"}"#);

            let frame = serde_json::json!({
                "type": "frame",
                "data": payload,
                "stats": {"processingTime": 6.5},
            });
            ws.send(Message::Text(frame.to_string().into())).await.expect("send");
            ws.send(Message::Text(r#"{"type":"stats","data":{"fps":14.0}}"#.into()))
                .await
                .expect("send");

            // Hold the socket open until the viewer hangs up.
            while let Some(Ok(_)) = ws.next().await {}
        });

        let viewer = quiet_viewer(format!("ws://127.0.0.1:{port}")).spawn().expect("spawn");
        let mut events = viewer.subscribe();
        viewer.connect(None).expect("connect");

        next_matching(&mut events, |e| {
            matches!(e, ViewerEvent::StatusChanged(s) if s.online)
        })
        .await;

        let ViewerEvent::FrameRendered { frame, stats, .. } =
            next_matching(&mut events, |e| matches!(e, ViewerEvent::FrameRendered { demo: false, .. })).await
        else {
            unreachable!();
        };
        assert_eq!(frame.resolution(), "16 x 12");
        assert_eq!(stats.frame_count, 1);
        assert_eq!(stats.processing_time_ms, 6.5);

        let ViewerEvent::StatsUpdated(stats) =
            next_matching(&mut events, |e| matches!(e, ViewerEvent::StatsUpdated(_))).await
        else {
            unreachable!();
        };
        assert_eq!(stats.fps, 14.0);
        assert_eq!(stats.frame_count, 1);

        eventually(&viewer, |v| v.status().connected && v.stats().fps == 14.0).await;

        viewer.disconnect().expect("disconnect");
        next_matching(&mut events, |e| {
            matches!(e, ViewerEvent::StatusChanged(s) if !s.online)
        })
        .await;

        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server finished")
            .expect("server task");
        viewer.shutdown();
    }

    #[tokio::test]
    async fn test_reconnect_backoff_until_exhausted() -> anyhow::Result<()> {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        drop(listener);

        let viewer = quiet_viewer(format!("ws://127.0.0.1:{port}"))
            .reconnect_interval(Duration::from_millis(20))
            .max_reconnect_attempts(3)
            .spawn()?;
        let mut events = viewer.subscribe();
        viewer.connect(None)?;

        let mut delays = Vec::new();
        loop {
            match next_matching(&mut events, |e| {
                matches!(
                    e,
                    ViewerEvent::ReconnectScheduled { .. } | ViewerEvent::RetriesExhausted { .. }
                )
            })
            .await
            {
                ViewerEvent::ReconnectScheduled { delay, .. } => delays.push(delay.as_millis()),
                ViewerEvent::RetriesExhausted { attempts } => {
                    assert_eq!(attempts, 3);
                    break;
                }
                _ => unreachable!(),
            }
        }

        assert_eq!(delays, vec![20, 40, 60]);
        assert!(!viewer.status().connected);
        viewer.shutdown();
        Ok(())
    }

    #[tokio::test]
    async fn test_pairing_retargets_viewer() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut ws = tokio_tungstenite::accept_async(stream).await.expect("upgrade");
            let _ = ws.next().await;
        });

        let viewer = quiet_viewer("ws://127.0.0.1:1".to_string())
            .auto_reconnect(false)
            .spawn()
            .expect("spawn");
        let mut events = viewer.subscribe();

        let payload = serde_json::json!({
            "type": "edgedetector_connection",
            "expectedServer": format!("ws://127.0.0.1:{port}"),
        });
        viewer.handle_pairing(&payload).expect("pairing");

        next_matching(&mut events, |e| {
            matches!(e, ViewerEvent::StatusChanged(s) if s.online)
        })
        .await;
        let expected = format!("ws://127.0.0.1:{port}");
        eventually(&viewer, |v| v.status().url == expected).await;

        viewer.shutdown();
        let _ = tokio::time::timeout(Duration::from_secs(5), server).await;
    }
}
