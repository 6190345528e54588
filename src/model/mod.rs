//! Synced entity types.
//!
//! | Type | Patch | Store |
//! |------|-------|-------|
//! | [`Ride`] | [`RidePatch`] | [`crate::store::RideStore`] |
//! | [`Driver`] | [`DriverPatch`] | [`crate::store::DriverStore`] |
//!
//! A patch enumerates the only fields a merge update may change. Everything
//! else on an entity is written by a full insert or a snapshot replace.

// ============================================================================
// Submodules
// ============================================================================

/// Driver entity.
pub mod driver;

/// Ride entity.
pub mod ride;

// ============================================================================
// Re-exports
// ============================================================================

pub use driver::{Driver, DriverPatch, DriverStatus};
pub use ride::{Ride, RidePatch, RideStatus};
