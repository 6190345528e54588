//! The [`Entity`] seam between the generic store and concrete entity kinds.

// ============================================================================
// Imports
// ============================================================================

use std::fmt::{Debug, Display};
use std::hash::Hash;

use crate::identifiers::{DriverId, RideId};
use crate::model::{Driver, DriverPatch, Ride, RidePatch};

// ============================================================================
// Entity
// ============================================================================

/// A keyed value that can be merged with a partial update.
///
/// Each implementation designates exactly one merge function over its own
/// patch type, so the set of merge-writable fields is closed per kind.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Identity type.
    type Id: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static;

    /// Partial update type.
    type Patch: Debug + Send + Sync;

    /// Returns the entity identity.
    fn id(&self) -> &Self::Id;

    /// Applies a partial update. Returns `true` if anything changed.
    fn merge(&mut self, patch: &Self::Patch) -> bool;

    /// Builds the patch that carries every merge-writable field of `self`.
    fn to_patch(&self) -> Self::Patch;
}

// ============================================================================
// Implementations
// ============================================================================

impl Entity for Ride {
    type Id = RideId;
    type Patch = RidePatch;

    #[inline]
    fn id(&self) -> &RideId {
        &self.id
    }

    #[inline]
    fn merge(&mut self, patch: &RidePatch) -> bool {
        self.apply_patch(patch)
    }

    #[inline]
    fn to_patch(&self) -> RidePatch {
        RidePatch::from(self)
    }
}

impl Entity for Driver {
    type Id = DriverId;
    type Patch = DriverPatch;

    #[inline]
    fn id(&self) -> &DriverId {
        &self.id
    }

    #[inline]
    fn merge(&mut self, patch: &DriverPatch) -> bool {
        self.apply_patch(patch)
    }

    #[inline]
    fn to_patch(&self) -> DriverPatch {
        DriverPatch::from(self)
    }
}
