//! Inbound frame routing.
//!
//! Decodes one frame at a time and applies it as a merge (or
//! insert-if-absent) to the stores, enqueueing the matching notification.
//! Malformed and unknown frames are dropped with a trace log.
//!
//! | Event | Store effect | Notification |
//! |-------|--------------|--------------|
//! | `ride:requested` | insert if absent, else status `matching` | info |
//! | `ride:offered` | status `offered`, driver, fare | info |
//! | `ride:no_drivers` | status `no_drivers` | warning |
//! | `ride:matched` | status (server or `accepted`), driver, fare | success |
//! | `ride:started` | status (server or `in_progress`), trip | success |
//! | `ride:completed` | status (server or `completed`), fare, trip | success |
//! | `ride:cancelled` | status `cancelled` | success |
//! | `driver:location_update` | location | - |
//! | `driver:status_changed` | status | - |
//! | `pong` | - | - |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tracing::{debug, trace};

use crate::identifiers::RideId;
use crate::model::{DriverPatch, RidePatch, RideStatus};
use crate::notification::{NotificationQueue, Severity};
use crate::protocol::PushEvent;
use crate::store::{DriverStore, RideStore};

// ============================================================================
// EventRouter
// ============================================================================

/// Applies push events to the stores.
pub struct EventRouter {
    rides: Arc<RideStore>,
    drivers: Arc<DriverStore>,
    notifications: NotificationQueue,
    torn_down: Arc<AtomicBool>,
}

impl EventRouter {
    /// Creates a router over shared stores.
    ///
    /// Once `torn_down` is set, frames are ignored before any side effect.
    #[must_use]
    pub fn new(
        rides: Arc<RideStore>,
        drivers: Arc<DriverStore>,
        notifications: NotificationQueue,
        torn_down: Arc<AtomicBool>,
    ) -> Self {
        Self {
            rides,
            drivers,
            notifications,
            torn_down,
        }
    }

    /// Decodes and applies one text frame.
    ///
    /// Returns `true` if the frame was a known, well-formed event.
    pub fn route(&self, text: &str) -> bool {
        if self.torn_down.load(Ordering::Acquire) {
            trace!("Frame ignored after teardown");
            return false;
        }

        match PushEvent::decode(text) {
            Ok(event) => {
                self.apply(event);
                true
            }
            Err(e) => {
                trace!(error = %e, "Dropping frame");
                false
            }
        }
    }

    /// Applies an already decoded event.
    pub fn apply(&self, event: PushEvent) {
        if self.torn_down.load(Ordering::Acquire) {
            return;
        }

        debug!(kind = event.kind(), "Applying push event");

        match event {
            PushEvent::RideRequested(requested) => {
                let ride_id = requested.ride_id.clone();
                let ride = requested.into_ride(Utc::now());

                if !self.rides.insert_if_absent(ride) {
                    self.rides
                        .merge_update(&ride_id, &RidePatch::status(RideStatus::Matching));
                }

                self.notifications.add(
                    Severity::Info,
                    format!("New ride requested: {}", ride_id.short()),
                );
            }

            PushEvent::RideOffered {
                ride_id,
                driver_id,
                estimated_fare,
            } => {
                let patch = RidePatch::status(RideStatus::Offered)
                    .with_driver(driver_id)
                    .with_estimated_fare(estimated_fare);
                self.merge_ride(&ride_id, &patch, Severity::Info, "offered");
            }

            PushEvent::RideNoDrivers { ride_id, reason } => {
                trace!(ride_id = %ride_id, ?reason, "No drivers");
                let patch = RidePatch::status(RideStatus::NoDrivers);
                self.merge_ride(&ride_id, &patch, Severity::Warning, "no drivers found");
            }

            PushEvent::RideMatched {
                ride_id,
                status,
                driver_id,
                estimated_fare,
            } => {
                let patch = RidePatch::status(status.unwrap_or(RideStatus::Accepted))
                    .with_driver(driver_id)
                    .with_estimated_fare(estimated_fare);
                self.merge_ride(&ride_id, &patch, Severity::Success, "matched");
            }

            PushEvent::RideStarted {
                ride_id,
                status,
                trip_id,
            } => {
                let patch =
                    RidePatch::status(status.unwrap_or(RideStatus::InProgress)).with_trip(trip_id);
                self.merge_ride(&ride_id, &patch, Severity::Success, "started");
            }

            PushEvent::RideCompleted {
                ride_id,
                status,
                trip_id,
                total_fare,
            } => {
                let patch = RidePatch::status(status.unwrap_or(RideStatus::Completed))
                    .with_trip(trip_id)
                    .with_total_fare(total_fare);
                self.merge_ride(&ride_id, &patch, Severity::Success, "completed");
            }

            PushEvent::RideCancelled { ride_id, reason } => {
                trace!(ride_id = %ride_id, ?reason, "Cancelled");
                let patch = RidePatch::status(RideStatus::Cancelled);
                self.merge_ride(&ride_id, &patch, Severity::Success, "cancelled");
            }

            PushEvent::DriverLocationUpdate {
                driver_id,
                lat,
                lng,
            } => {
                self.drivers.update_location(&driver_id, lat, lng);
            }

            PushEvent::DriverStatusChanged { driver_id, status } => {
                self.drivers
                    .merge_update(&driver_id, &DriverPatch::status(status));
            }

            PushEvent::Pong => trace!("Heartbeat acknowledged"),
        }
    }

    /// Merges a ride patch and notifies, whether or not the ride is known.
    fn merge_ride(&self, ride_id: &RideId, patch: &RidePatch, severity: Severity, outcome: &str) {
        self.rides.merge_update(ride_id, patch);
        self.notifications
            .add(severity, format!("Ride {} => {outcome}", ride_id.short()));
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("torn_down", &self.torn_down.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
