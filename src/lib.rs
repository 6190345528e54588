//! RideFlux Sync - live ride and driver state for dispatch dashboards.
//!
//! This library keeps an in-memory view of rides and drivers consistent with
//! a dispatch server by combining a persistent WebSocket push channel with
//! full HTTP snapshots.
//!
//! # Architecture
//!
//! The client is a single owned value wiring four parts together:
//!
//! - **Connection manager**: one push channel with exponential reconnect
//!   backoff, a 30 s heartbeat and clean teardown
//! - **Event router**: decodes `{ "type": ... }` frames into [`PushEvent`]s
//!   and merges them into the stores
//! - **Snapshot reconciler**: replaces both stores on every (re)open
//! - **Entity stores**: keyed tables whose merge updates never drop fields
//!
//! Commands (request, cancel, accept, trip, payment) go through the HTTP
//! [`ApiClient`] and their responses land in the same stores.
//!
//! # Quick Start
//!
//! ```no_run
//! use rideflux_sync::{Result, RideStatus, SyncClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = SyncClient::builder()
//!         .origin("https://dispatch.example.com")
//!         .auth_token("secret")
//!         .build()?;
//!
//!     client.connect().await;
//!
//!     let waiting = client.rides().by_status(&RideStatus::Matching);
//!     println!("{} rides waiting for a driver", waiting.len());
//!
//!     client.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`SyncClient`], builder and configuration |
//! | [`api`] | Typed HTTP client |
//! | [`store`] | Entity stores and merge semantics |
//! | [`sync`] | Push router and snapshot reconciler |
//! | [`notification`] | Auto-expiring notification queue |
//! | [`model`] | Ride and driver records |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Push frame types |
//! | [`transport`] | Push channel lifecycle |

// ============================================================================
// Modules
// ============================================================================

/// Typed HTTP client for commands and snapshots.
pub mod api;

/// Sync client, builder and configuration.
///
/// Use [`SyncClient::builder()`] to create a configured client.
pub mod client;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for rides, drivers and notifications.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Ride and driver records with their patches.
pub mod model;

/// Auto-expiring notification queue.
pub mod notification;

/// Push channel frame types.
pub mod protocol;

/// Keyed entity stores.
pub mod store;

/// Push routing and snapshot reconciliation.
pub mod sync;

/// Push channel transport.
///
/// Connection lifecycle, reconnect backoff and heartbeat.
pub mod transport;

#[cfg(test)]
mod test_support;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{ClientConfig, SyncClient, SyncClientBuilder};

// API types
pub use api::{ApiClient, CreateRide, EndTrip, Payment, PaymentMethod, Trip, VehicleType};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{DriverId, NotificationId, PaymentId, RideId, RiderId, TripId};

// Model types
pub use model::{Driver, DriverStatus, Ride, RideStatus};

// Store types
pub use store::{DriverStore, RideStore};

// Notification types
pub use notification::{Notification, NotificationQueue, Severity};

// Transport types
pub use protocol::PushEvent;
pub use transport::{ConnectionState, ReconnectPolicy};
