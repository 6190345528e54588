//! Push channel wire format.
//!
//! # Protocol Overview
//!
//! | Message | Direction | Format |
//! |---------|-----------|--------|
//! | Heartbeat | Local → Remote | literal text `ping` |
//! | Event | Remote → Local | flat JSON object, `type` discriminator |
//! | Heartbeat ack | Remote → Local | `{"type":"pong"}` |
//!
//! The push channel lives at [`DASHBOARD_PATH`] on the page origin, with the
//! scheme upgraded to `wss` when the origin is `https`.

// ============================================================================
// Submodules
// ============================================================================

/// Event envelope and typed events.
pub mod event;

// ============================================================================
// Constants
// ============================================================================

/// Outbound heartbeat frame. Deliberately not JSON.
pub const HEARTBEAT_FRAME: &str = "ping";

/// Path of the dashboard push channel on the page origin.
pub const DASHBOARD_PATH: &str = "/ws/dashboard";

// ============================================================================
// Re-exports
// ============================================================================

pub use event::{Envelope, PushEvent, RideRequested};
