//! Full-state refresh on (re)connection.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::{Driver, Ride};
use crate::store::{DriverStore, RideStore};

// ============================================================================
// SnapshotSource
// ============================================================================

/// Supplier of complete, authoritative collections.
#[async_trait]
pub trait SnapshotSource: Send + Sync + 'static {
    /// Fetches every ride.
    ///
    /// # Errors
    ///
    /// Returns an error if the rides cannot be fetched.
    async fn fetch_rides(&self) -> Result<Vec<Ride>>;

    /// Fetches every driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the drivers cannot be fetched.
    async fn fetch_drivers(&self) -> Result<Vec<Driver>>;
}

// ============================================================================
// SnapshotReconciler
// ============================================================================

/// Replaces both stores wholesale from a [`SnapshotSource`].
pub struct SnapshotReconciler {
    source: Arc<dyn SnapshotSource>,
    rides: Arc<RideStore>,
    drivers: Arc<DriverStore>,
    torn_down: Arc<AtomicBool>,
}

impl SnapshotReconciler {
    /// Creates a reconciler over shared stores.
    #[must_use]
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        rides: Arc<RideStore>,
        drivers: Arc<DriverStore>,
        torn_down: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            rides,
            drivers,
            torn_down,
        }
    }

    /// Fetches both collections concurrently and replaces the stores.
    ///
    /// Either both stores are replaced or neither is. Failures are logged
    /// and reported as `false`; the next reconnection retries.
    pub async fn reconcile(&self) -> bool {
        let fetched = tokio::try_join!(self.source.fetch_rides(), self.source.fetch_drivers());

        let (rides, drivers) = match fetched {
            Ok(collections) => collections,
            Err(e) => {
                warn!(error = %e, "Snapshot fetch failed");
                return false;
            }
        };

        if self.torn_down.load(Ordering::Acquire) {
            debug!("Snapshot discarded after teardown");
            return false;
        }

        let (ride_count, driver_count) = (rides.len(), drivers.len());
        self.rides.replace_all(rides);
        self.drivers.replace_all(drivers);

        debug!(rides = ride_count, drivers = driver_count, "Snapshot applied");
        true
    }
}

impl std::fmt::Debug for SnapshotReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotReconciler")
            .field("rides", &self.rides.len())
            .field("drivers", &self.drivers.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
