//! Store synchronisation: incremental push routing and full snapshots.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `router` | Decode push frames, merge into stores, notify |
//! | `snapshot` | Fetch full collections and replace stores |

// ============================================================================
// Submodules
// ============================================================================

/// Push frame router.
pub mod router;

/// Snapshot reconciler.
pub mod snapshot;

// ============================================================================
// Re-exports
// ============================================================================

pub use router::EventRouter;
pub use snapshot::{SnapshotReconciler, SnapshotSource};
