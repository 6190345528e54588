//! In-memory connector for tests.
//!
//! Each connect attempt pops one scripted outcome; an empty script refuses.
//! Accepted channels are driven from the test through a [`MockRemote`].

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;
use url::Url;

use super::channel::{Channel, Connector};
use crate::error::{Error, Result};

// ============================================================================
// MockConnector
// ============================================================================

/// Log of frames written by the local side.
type SentLog = Arc<Mutex<Vec<(Instant, String)>>>;

/// A channel waiting to be handed out.
struct PendingChannel {
    inbound: mpsc::UnboundedReceiver<String>,
    sent: SentLog,
    closed: Arc<AtomicBool>,
}

#[derive(Default)]
struct ConnectorState {
    script: VecDeque<Option<PendingChannel>>,
    attempts: Vec<Instant>,
}

/// Scripted connector.
#[derive(Clone, Default)]
pub(crate) struct MockConnector {
    state: Arc<Mutex<ConnectorState>>,
}

impl MockConnector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Scripts the next attempt to succeed.
    pub(crate) fn push_accept(&self) -> MockRemote {
        let (inbound_tx, inbound) = mpsc::unbounded_channel();
        let sent = SentLog::default();
        let closed = Arc::new(AtomicBool::new(false));

        self.state.lock().script.push_back(Some(PendingChannel {
            inbound,
            sent: Arc::clone(&sent),
            closed: Arc::clone(&closed),
        }));

        MockRemote {
            inbound_tx: Mutex::new(Some(inbound_tx)),
            sent,
            closed,
        }
    }

    /// Scripts the next attempt to fail.
    pub(crate) fn push_refuse(&self) {
        self.state.lock().script.push_back(None);
    }

    /// Instants of every connect attempt so far.
    pub(crate) fn attempts(&self) -> Vec<Instant> {
        self.state.lock().attempts.clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, address: &Url) -> Result<Box<dyn Channel>> {
        let mut state = self.state.lock();
        state.attempts.push(Instant::now());

        match state.script.pop_front().flatten() {
            Some(pending) => Ok(Box::new(MockChannel {
                inbound: pending.inbound,
                sent: pending.sent,
                closed: pending.closed,
            })),
            None => Err(Error::connection(format!("refused: {address}"))),
        }
    }
}

// ============================================================================
// MockChannel / MockRemote
// ============================================================================

struct MockChannel {
    inbound: mpsc::UnboundedReceiver<String>,
    sent: SentLog,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl Channel for MockChannel {
    async fn send_text(&mut self, text: &str) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::ConnectionClosed);
        }
        self.sent.lock().push((Instant::now(), text.to_string()));
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String>> {
        self.inbound.recv().await.map(Ok)
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
        self.inbound.close();
    }
}

/// Test-side handle of an accepted channel.
pub(crate) struct MockRemote {
    inbound_tx: Mutex<Option<mpsc::UnboundedSender<String>>>,
    sent: SentLog,
    closed: Arc<AtomicBool>,
}

impl MockRemote {
    /// Pushes a frame to the local side.
    pub(crate) fn deliver(&self, text: impl Into<String>) {
        if let Some(tx) = self.inbound_tx.lock().as_ref() {
            let _ = tx.send(text.into());
        }
    }

    /// Closes the channel from the remote side.
    pub(crate) fn close(&self) {
        self.inbound_tx.lock().take();
    }

    /// Frames written by the local side.
    pub(crate) fn sent(&self) -> Vec<(Instant, String)> {
        self.sent.lock().clone()
    }

    /// Whether the local side closed the channel.
    pub(crate) fn is_closed_locally(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
