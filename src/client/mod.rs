//! Top-level sync client.
//!
//! This module provides the main entry point: one explicitly constructed
//! owner for both stores, the notification queue and the push channel.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SyncClient`] | Stores, connection lifecycle and command façade |
//! | [`SyncClientBuilder`] | Fluent configuration builder |
//! | [`ClientConfig`] | Origin, API root, token and timing |
//!
//! # Example
//!
//! ```no_run
//! use rideflux_sync::{ClientConfig, Result, SyncClient};
//!
//! # async fn example() -> Result<()> {
//! let client = SyncClient::builder()
//!     .config(ClientConfig::from_env()?)
//!     .build()?;
//!
//! client.connect().await;
//! for ride in client.rides().list_all() {
//!     println!("{} {}", ride.id, ride.status);
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for client configuration.
pub mod builder;

/// Environment configuration and push URL derivation.
pub mod config;

/// Core client implementation.
pub mod core;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::SyncClientBuilder;
pub use config::{ClientConfig, ENV_API_BASE_URL, ENV_AUTH_TOKEN, ENV_ORIGIN, push_url};
pub use core::SyncClient;
