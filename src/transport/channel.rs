//! Channel abstraction and the WebSocket implementation.
//!
//! The manager only sees [`Connector`] and [`Channel`]; production code uses
//! [`WsConnector`], tests use an in-memory connector.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace};
use url::Url;

use crate::error::Result;

// ============================================================================
// Traits
// ============================================================================

/// Opens channels to an address.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Establishes one physical channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel cannot be opened.
    async fn connect(&self, address: &Url) -> Result<Box<dyn Channel>>;
}

/// One open, bidirectional text channel.
#[async_trait]
pub trait Channel: Send {
    /// Sends one text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be written.
    async fn send_text(&mut self, text: &str) -> Result<()>;

    /// Receives the next text frame.
    ///
    /// Returns `None` once the remote side has closed. Must be cancel-safe.
    async fn recv(&mut self) -> Option<Result<String>>;

    /// Closes the channel. Errors are ignored.
    async fn close(&mut self);
}

// ============================================================================
// WsConnector
// ============================================================================

/// WebSocket connector (`ws://` and `wss://`).
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, address: &Url) -> Result<Box<dyn Channel>> {
        let (stream, response) = connect_async(address.as_str()).await?;
        debug!(%address, status = %response.status(), "WebSocket handshake completed");
        Ok(Box::new(WsChannel { stream }))
    }
}

/// WebSocket stream wrapper.
struct WsChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Channel for WsChannel {
    async fn send_text(&mut self, text: &str) -> Result<()> {
        self.stream.send(Message::Text(text.to_owned().into())).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.to_string())),
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "WebSocket closed by remote");
                    return None;
                }
                Ok(other) => trace!(kind = ?other, "Ignoring non-text frame"),
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}
