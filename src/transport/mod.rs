//! Push channel transport.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐                        ┌──────────────────┐
//! │  ConnectionManager   │       WebSocket        │  Dispatch server │
//! │  (session task)      │◄──────────────────────►│  /ws/dashboard   │
//! │  → FrameHandler      │   text frames, ping    │                  │
//! └──────────────────────┘                        └──────────────────┘
//! ```
//!
//! # Session Lifecycle
//!
//! 1. `ConnectionManager::connect` - spawn the session task
//! 2. `Connector::connect` - open one channel
//! 3. `FrameHandler::on_open` - snapshot trigger
//! 4. Frames flow to `FrameHandler::on_frame`; `ping` every 30 s
//! 5. On loss, back off and retry; `disconnect` ends the session
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `backoff` | Reconnect and heartbeat timing |
//! | `channel` | Connector/channel traits, WebSocket implementation |
//! | `manager` | Lifecycle state machine and session task |

// ============================================================================
// Submodules
// ============================================================================

/// Reconnect and heartbeat timing.
pub mod backoff;

/// Connector and channel abstraction.
pub mod channel;

/// Connection lifecycle manager.
pub mod manager;

#[cfg(test)]
pub(crate) mod mock;

// ============================================================================
// Re-exports
// ============================================================================

pub use backoff::ReconnectPolicy;
pub use channel::{Channel, Connector, WsConnector};
pub use manager::{ConnectionManager, ConnectionState, FrameHandler};
