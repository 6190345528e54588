//! Driver entity and its merge patch.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identifiers::DriverId;

// ============================================================================
// DriverStatus
// ============================================================================

/// Availability status of a driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DriverStatus {
    /// Free to take offers.
    Available,
    /// Holding an offer or en route.
    Busy,
    /// Driving a trip.
    OnTrip,
    /// Not accepting work.
    Offline,
    /// Any status this client does not know.
    Other(String),
}

impl DriverStatus {
    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Available => "available",
            Self::Busy => "busy",
            Self::OnTrip => "on_trip",
            Self::Offline => "offline",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for DriverStatus {
    fn from(value: &str) -> Self {
        match value {
            "available" => Self::Available,
            "busy" => Self::Busy,
            "on_trip" => Self::OnTrip,
            "offline" => Self::Offline,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for DriverStatus {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<DriverStatus> for String {
    fn from(value: DriverStatus) -> Self {
        match value {
            DriverStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Driver
// ============================================================================

/// A driver as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    /// Driver identity.
    pub id: DriverId,
    /// Display name.
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Vehicle class.
    pub vehicle_type: String,
    /// Availability status.
    pub status: DriverStatus,
    /// Last known latitude.
    #[serde(default)]
    pub current_lat: Option<f64>,
    /// Last known longitude.
    #[serde(default)]
    pub current_lng: Option<f64>,
    /// Average rating.
    #[serde(default)]
    pub rating: f64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Driver {
    /// Returns the current position if both coordinates are known.
    #[inline]
    #[must_use]
    pub fn location(&self) -> Option<(f64, f64)> {
        self.current_lat.zip(self.current_lng)
    }

    /// Applies a patch field by field.
    ///
    /// Returns `true` if any field changed.
    pub fn apply_patch(&mut self, patch: &DriverPatch) -> bool {
        let mut changed = false;

        if let Some(status) = &patch.status
            && *status != self.status
        {
            self.status = status.clone();
            changed = true;
        }

        if let Some((lat, lng)) = patch.location
            && self.location() != Some((lat, lng))
        {
            self.current_lat = Some(lat);
            self.current_lng = Some(lng);
            changed = true;
        }

        changed
    }
}

// ============================================================================
// DriverPatch
// ============================================================================

/// Fields a merge update may change on a [`Driver`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverPatch {
    /// New status.
    pub status: Option<DriverStatus>,
    /// New position as `(lat, lng)`.
    pub location: Option<(f64, f64)>,
}

impl DriverPatch {
    /// Creates a patch that only sets the status.
    #[inline]
    #[must_use]
    pub fn status(status: DriverStatus) -> Self {
        Self {
            status: Some(status),
            location: None,
        }
    }

    /// Creates a patch that only moves the driver.
    #[inline]
    #[must_use]
    pub fn location(lat: f64, lng: f64) -> Self {
        Self {
            status: None,
            location: Some((lat, lng)),
        }
    }
}

impl From<&Driver> for DriverPatch {
    fn from(driver: &Driver) -> Self {
        Self {
            status: Some(driver.status.clone()),
            location: driver.location(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
