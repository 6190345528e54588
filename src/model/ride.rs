//! Ride entity and its merge patch.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identifiers::{DriverId, RideId, RiderId, TripId};

// ============================================================================
// RideStatus
// ============================================================================

/// Lifecycle status of a ride.
///
/// Unknown server values are preserved in [`RideStatus::Other`] so that a
/// newer backend never breaks decoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RideStatus {
    /// Created, not yet matching.
    Pending,
    /// Looking for a driver.
    Matching,
    /// Offered to a driver.
    Offered,
    /// Driver accepted.
    Accepted,
    /// Driver on the way to pickup.
    DriverEnRoute,
    /// Driver at pickup.
    Arrived,
    /// Trip running (server naming).
    InTrip,
    /// Trip running (client naming after a local start).
    InProgress,
    /// Trip finished.
    Completed,
    /// Cancelled by rider or system.
    Cancelled,
    /// Matching exhausted all offers.
    NoDrivers,
    /// Payment processed.
    Paid,
    /// Any status this client does not know.
    Other(String),
}

impl RideStatus {
    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Matching => "matching",
            Self::Offered => "offered",
            Self::Accepted => "accepted",
            Self::DriverEnRoute => "driver_en_route",
            Self::Arrived => "arrived",
            Self::InTrip => "in_trip",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoDrivers => "no_drivers",
            Self::Paid => "paid",
            Self::Other(s) => s,
        }
    }

    /// Returns `true` if no further server transition is expected.
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Cancelled | Self::NoDrivers | Self::Paid
        )
    }
}

impl From<&str> for RideStatus {
    fn from(value: &str) -> Self {
        match value {
            "pending" => Self::Pending,
            "matching" => Self::Matching,
            "offered" => Self::Offered,
            "accepted" => Self::Accepted,
            "driver_en_route" => Self::DriverEnRoute,
            "arrived" => Self::Arrived,
            "in_trip" => Self::InTrip,
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            "no_drivers" => Self::NoDrivers,
            "paid" => Self::Paid,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for RideStatus {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<RideStatus> for String {
    fn from(value: RideStatus) -> Self {
        match value {
            RideStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Ride
// ============================================================================

/// A ride request as returned by the API and mirrored by push events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    /// Ride identity.
    pub id: RideId,
    /// Requesting rider.
    #[serde(default)]
    pub rider_id: Option<RiderId>,
    /// Lifecycle status.
    pub status: RideStatus,
    /// Pickup latitude.
    pub pickup_lat: f64,
    /// Pickup longitude.
    pub pickup_lng: f64,
    /// Pickup display address.
    #[serde(default)]
    pub pickup_address: Option<String>,
    /// Destination latitude.
    pub dest_lat: f64,
    /// Destination longitude.
    pub dest_lng: f64,
    /// Destination display address.
    #[serde(default)]
    pub dest_address: Option<String>,
    /// Vehicle class (`auto`, `mini`, `sedan`, `suv`).
    pub vehicle_type: String,
    /// Payment method (`cash`, `card`, `wallet`).
    pub payment_method: String,
    /// Surge multiplier applied at request time.
    pub surge_multiplier: f64,
    /// Fare estimate.
    #[serde(default)]
    pub estimated_fare: Option<f64>,
    /// Driver matched or offered.
    #[serde(default)]
    pub matched_driver_id: Option<DriverId>,
    /// Trip started for this ride.
    #[serde(default)]
    pub trip_id: Option<TripId>,
    /// Final fare after completion.
    #[serde(default)]
    pub total_fare: Option<f64>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// RidePatch
// ============================================================================

/// Fields a merge update may change on a [`Ride`].
///
/// `None` leaves the field untouched. Location, rider, vehicle and pricing
/// inputs are only ever set by a full insert or snapshot replace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RidePatch {
    /// New status.
    pub status: Option<RideStatus>,
    /// Matched or offered driver.
    pub matched_driver_id: Option<DriverId>,
    /// Fare estimate.
    pub estimated_fare: Option<f64>,
    /// Trip reference.
    pub trip_id: Option<TripId>,
    /// Final fare.
    pub total_fare: Option<f64>,
}

impl RidePatch {
    /// Creates a patch that only sets the status.
    #[inline]
    #[must_use]
    pub fn status(status: RideStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Sets the matched driver.
    #[inline]
    #[must_use]
    pub fn with_driver(mut self, driver_id: Option<DriverId>) -> Self {
        self.matched_driver_id = driver_id;
        self
    }

    /// Sets the estimated fare.
    #[inline]
    #[must_use]
    pub fn with_estimated_fare(mut self, fare: Option<f64>) -> Self {
        self.estimated_fare = fare;
        self
    }

    /// Sets the trip reference.
    #[inline]
    #[must_use]
    pub fn with_trip(mut self, trip_id: Option<TripId>) -> Self {
        self.trip_id = trip_id;
        self
    }

    /// Sets the total fare.
    #[inline]
    #[must_use]
    pub fn with_total_fare(mut self, fare: Option<f64>) -> Self {
        self.total_fare = fare;
        self
    }
}

impl From<&Ride> for RidePatch {
    fn from(ride: &Ride) -> Self {
        Self {
            status: Some(ride.status.clone()),
            matched_driver_id: ride.matched_driver_id.clone(),
            estimated_fare: ride.estimated_fare,
            trip_id: ride.trip_id.clone(),
            total_fare: ride.total_fare,
        }
    }
}

impl Ride {
    /// Applies a patch field by field.
    ///
    /// Returns `true` if any field changed.
    pub fn apply_patch(&mut self, patch: &RidePatch) -> bool {
        let before = (
            self.status.clone(),
            self.matched_driver_id.clone(),
            self.estimated_fare,
            self.trip_id.clone(),
            self.total_fare,
        );

        if let Some(status) = &patch.status {
            self.status = status.clone();
        }
        if let Some(driver_id) = &patch.matched_driver_id {
            self.matched_driver_id = Some(driver_id.clone());
        }
        if let Some(fare) = patch.estimated_fare {
            self.estimated_fare = Some(fare);
        }
        if let Some(trip_id) = &patch.trip_id {
            self.trip_id = Some(trip_id.clone());
        }
        if let Some(fare) = patch.total_fare {
            self.total_fare = Some(fare);
        }

        before
            != (
                self.status.clone(),
                self.matched_driver_id.clone(),
                self.estimated_fare,
                self.trip_id.clone(),
                self.total_fare,
            )
    }
}

// ============================================================================
// Tests
// ============================================================================
