//! Connection lifecycle: connect, heartbeat, reconnect with backoff.
//!
//! # State Machine
//!
//! ```text
//! Idle ──connect──► Connecting ──ok──► Open ──disconnect──► Closing ──► Idle
//!                      ▲   │            │
//!                      │   └──fail──┐   └──lost──┐
//!                      │            ▼            ▼
//!                      └──delay── BackingOff ◄───┘
//!                                   │
//!                                   └──budget spent──► Abandoned
//! ```
//!
//! Each `connect` spawns one session task driven by `tokio::select!` over
//! inbound frames, the heartbeat, the backoff sleep and the command channel.
//! An explicit disconnect cancels whichever of those is pending.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use tracing::{debug, info, trace, warn};
use url::Url;

use super::backoff::ReconnectPolicy;
use super::channel::{Channel, Connector};
use crate::protocol::HEARTBEAT_FRAME;

// ============================================================================
// ConnectionState
// ============================================================================

/// Lifecycle state of the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// No session.
    #[default]
    Idle,
    /// Opening a channel.
    Connecting,
    /// Channel open; heartbeat running.
    Open,
    /// Intentional close in progress.
    Closing,
    /// Waiting before the next attempt.
    BackingOff,
    /// Reconnect budget spent. Only a new `connect` restarts.
    Abandoned,
}

impl ConnectionState {
    /// Returns `true` while a session is trying to reach or keep `Open`.
    #[inline]
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Connecting | Self::Open | Self::BackingOff)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closing => "closing",
            Self::BackingOff => "backing-off",
            Self::Abandoned => "abandoned",
        })
    }
}

// ============================================================================
// FrameHandler
// ============================================================================

/// Receives session callbacks. Runs on the session task; must not block.
pub trait FrameHandler: Send + Sync + 'static {
    /// Called on every transition into `Open`.
    fn on_open(&self);

    /// Called for each inbound text frame, in arrival order.
    fn on_frame(&self, text: &str);
}

// ============================================================================
// Session Plumbing
// ============================================================================

/// Internal commands for the session task.
enum SessionCommand {
    /// Write a frame if open.
    Send(String),
    /// Intentional, terminal close.
    Shutdown,
}

/// How an open channel ended.
enum OpenEnd {
    /// Shutdown requested.
    Shutdown,
    /// Remote close or I/O failure.
    Lost,
}

/// Handle to a running session task.
struct Session {
    command_tx: mpsc::UnboundedSender<SessionCommand>,
    task: JoinHandle<()>,
}

/// Everything the session task needs.
struct SessionContext {
    connector: Arc<dyn Connector>,
    handler: Arc<dyn FrameHandler>,
    policy: ReconnectPolicy,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    address: Url,
}

impl SessionContext {
    fn set_state(&self, state: ConnectionState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            debug!(from = %previous, to = %state, "Connection state changed");
        }
    }
}

// ============================================================================
// ConnectionManager
// ============================================================================

/// Owns one persistent push channel.
///
/// At most one physical channel exists per manager; `connect` tears down the
/// previous session before starting a new one.
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    handler: Arc<dyn FrameHandler>,
    policy: ReconnectPolicy,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    session: Mutex<Option<Session>>,
}

impl ConnectionManager {
    /// Creates an idle manager.
    #[must_use]
    pub fn new(
        connector: Arc<dyn Connector>,
        handler: Arc<dyn FrameHandler>,
        policy: ReconnectPolicy,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Idle);
        Self {
            connector,
            handler,
            policy,
            state_tx: Arc::new(state_tx),
            session: Mutex::new(None),
        }
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Returns the timing policy.
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// Starts a session to `address`, replacing any running one.
    pub async fn connect(&self, address: Url) {
        self.stop_session().await;

        info!(%address, "Connecting push channel");

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let context = SessionContext {
            connector: Arc::clone(&self.connector),
            handler: Arc::clone(&self.handler),
            policy: self.policy.clone(),
            state_tx: Arc::clone(&self.state_tx),
            address,
        };
        context.set_state(ConnectionState::Connecting);

        let task = tokio::spawn(Self::run_session(context, command_rx));
        *self.session.lock() = Some(Session { command_tx, task });
    }

    /// Intentionally closes the channel and suppresses reconnection.
    ///
    /// Cancels a pending heartbeat or backoff sleep. Ends in `Idle`.
    pub async fn disconnect(&self) {
        self.stop_session().await;
        let previous = self.state_tx.send_replace(ConnectionState::Idle);
        if previous != ConnectionState::Idle {
            info!(from = %previous, "Push channel disconnected");
        }
    }

    /// Sends a frame if the channel is open.
    ///
    /// Returns `false` (frame dropped) in any other state.
    pub fn send(&self, frame: impl Into<String>) -> bool {
        if self.state() != ConnectionState::Open {
            trace!(state = %self.state(), "Dropping outbound frame");
            return false;
        }

        self.session
            .lock()
            .as_ref()
            .is_some_and(|s| s.command_tx.send(SessionCommand::Send(frame.into())).is_ok())
    }

    /// Stops the running session, if any, and waits for it to finish.
    async fn stop_session(&self) {
        let Some(session) = self.session.lock().take() else {
            return;
        };

        let _ = session.command_tx.send(SessionCommand::Shutdown);
        if let Err(e) = session.task.await {
            warn!(error = %e, "Session task ended abnormally");
        }
    }

    // ========================================================================
    // Session Task
    // ========================================================================

    /// Session loop: connect, run while open, back off, repeat.
    async fn run_session(
        context: SessionContext,
        mut command_rx: mpsc::UnboundedReceiver<SessionCommand>,
    ) {
        let mut attempt: u32 = 0;

        loop {
            context.set_state(ConnectionState::Connecting);

            let connected = tokio::select! {
                () = Self::wait_for_shutdown(&mut command_rx) => break,
                result = context.connector.connect(&context.address) => result,
            };

            match connected {
                Ok(mut channel) => {
                    attempt = 0;
                    context.set_state(ConnectionState::Open);
                    info!(address = %context.address, "Push channel open");
                    context.handler.on_open();

                    let end = Self::drive_open(&context, channel.as_mut(), &mut command_rx).await;
                    match end {
                        OpenEnd::Shutdown => {
                            context.set_state(ConnectionState::Closing);
                            channel.close().await;
                            break;
                        }
                        OpenEnd::Lost => {
                            channel.close().await;
                            warn!("Push channel lost");
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, attempt, "Push channel connect failed");
                }
            }

            if context.policy.is_exhausted(attempt) {
                context.set_state(ConnectionState::Abandoned);
                warn!(attempts = attempt, "Reconnect budget spent; giving up");
                return;
            }

            attempt += 1;
            let delay = context.policy.delay_for_attempt(attempt);
            context.set_state(ConnectionState::BackingOff);
            debug!(attempt, delay_ms = delay.as_millis() as u64, "Scheduling reconnect");

            tokio::select! {
                () = Self::wait_for_shutdown(&mut command_rx) => break,
                () = sleep(delay) => {}
            }
        }

        context.set_state(ConnectionState::Idle);
        debug!("Session task terminated");
    }

    /// Runs an open channel until it ends.
    async fn drive_open(
        context: &SessionContext,
        channel: &mut dyn Channel,
        command_rx: &mut mpsc::UnboundedReceiver<SessionCommand>,
    ) -> OpenEnd {
        let period = context.policy.heartbeat_interval;
        let mut heartbeat = interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                frame = channel.recv() => match frame {
                    Some(Ok(text)) => {
                        trace!(len = text.len(), "Frame received");
                        context.handler.on_frame(&text);
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Push channel read failed");
                        return OpenEnd::Lost;
                    }
                    None => {
                        debug!("Push channel closed by remote");
                        return OpenEnd::Lost;
                    }
                },

                _ = heartbeat.tick() => {
                    if let Err(e) = channel.send_text(HEARTBEAT_FRAME).await {
                        warn!(error = %e, "Heartbeat failed");
                        return OpenEnd::Lost;
                    }
                    trace!("Heartbeat sent");
                }

                command = command_rx.recv() => match command {
                    Some(SessionCommand::Send(text)) => {
                        if let Err(e) = channel.send_text(&text).await {
                            warn!(error = %e, "Send failed");
                            return OpenEnd::Lost;
                        }
                    }
                    Some(SessionCommand::Shutdown) | None => return OpenEnd::Shutdown,
                },
            }
        }
    }

    /// Resolves on `Shutdown` or when the manager is gone.
    ///
    /// Frames queued while not open are discarded.
    async fn wait_for_shutdown(command_rx: &mut mpsc::UnboundedReceiver<SessionCommand>) {
        while let Some(command) = command_rx.recv().await {
            match command {
                SessionCommand::Send(_) => trace!("Discarding frame queued while not open"),
                SessionCommand::Shutdown => return,
            }
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(session) = self.session.get_mut().take() {
            session.task.abort();
        }
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("state", &self.state())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
