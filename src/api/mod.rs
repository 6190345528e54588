//! HTTP request/response collaborator.
//!
//! | Operation | Method + path |
//! |-----------|---------------|
//! | create ride | `POST /v1/rides` |
//! | list / get ride | `GET /v1/rides`, `GET /v1/rides/{id}` |
//! | cancel ride | `POST /v1/rides/{id}/cancel` |
//! | list / get driver | `GET /v1/drivers`, `GET /v1/drivers/{id}` |
//! | driver location | `POST /v1/drivers/{id}/location` |
//! | accept / decline | `POST /v1/drivers/{id}/accept` |
//! | start / get / end trip | `POST /v1/trips/{ride_id}/start`, `GET /v1/trips/{id}`, `POST /v1/trips/{id}/end` |
//! | pay | `POST /v1/payments` |

// ============================================================================
// Submodules
// ============================================================================

/// reqwest-based client.
pub mod client;

/// Request and response types.
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{ApiClient, IDEMPOTENCY_HEADER};
pub use types::{
    CreatePayment, CreateRide, EndTrip, LocationUpdate, OfferResponse, Payment, PaymentMethod,
    Trip, VehicleType,
};
