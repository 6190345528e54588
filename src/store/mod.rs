//! Entity stores.
//!
//! One generic table type, [`EntityStore`], instantiated for rides and for
//! drivers. All mutation goes through its operations; both the push channel
//! and command responses converge through `insert_if_absent`,
//! `merge_update` and `upsert`, whichever arrives first.

// ============================================================================
// Submodules
// ============================================================================

/// Entity trait binding ids and patches to concrete kinds.
pub mod entity;

/// Generic keyed table.
pub mod table;

// ============================================================================
// Re-exports
// ============================================================================

pub use entity::Entity;
pub use table::{DriverStore, EntityStore, RideStore};
