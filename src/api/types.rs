//! Request bodies and response shapes of the HTTP collaborator.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identifiers::{DriverId, PaymentId, RideId, RiderId, TripId};
use crate::model::Ride;

// ============================================================================
// Enumerations
// ============================================================================

/// Vehicle class offered to riders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    /// Auto-rickshaw.
    Auto,
    /// Hatchback.
    Mini,
    /// Sedan.
    Sedan,
    /// SUV.
    Suv,
}

impl VehicleType {
    /// Returns the wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Mini => "mini",
            Self::Sedan => "sedan",
            Self::Suv => "suv",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a rider pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash to the driver.
    #[default]
    Cash,
    /// Card through the PSP.
    Card,
    /// In-app wallet.
    Wallet,
}

impl PaymentMethod {
    /// Returns the wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Wallet => "wallet",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Request Bodies
// ============================================================================

/// Body of `POST /v1/rides`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateRide {
    /// Requesting rider.
    pub rider_id: RiderId,
    /// Pickup latitude.
    pub pickup_lat: f64,
    /// Pickup longitude.
    pub pickup_lng: f64,
    /// Pickup display address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_address: Option<String>,
    /// Destination latitude.
    pub dest_lat: f64,
    /// Destination longitude.
    pub dest_lng: f64,
    /// Destination display address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_address: Option<String>,
    /// Requested vehicle class.
    pub vehicle_type: VehicleType,
    /// Payment method.
    pub payment_method: PaymentMethod,
}

/// Body of `POST /v1/drivers/{id}/location`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationUpdate {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

/// Body of `POST /v1/drivers/{id}/accept`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferResponse {
    /// Offered ride.
    pub ride_id: RideId,
    /// `true` to accept, `false` to decline.
    pub accept: bool,
}

/// Body of `POST /v1/trips/{id}/end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EndTrip {
    /// Distance driven in metres.
    pub distance_m: u64,
    /// Duration in seconds.
    pub duration_s: u64,
}

impl EndTrip {
    /// Road distance over straight-line distance.
    const ROAD_FACTOR: f64 = 1.3;

    /// Assumed average city speed.
    const AVERAGE_SPEED_KMH: f64 = 25.0;

    /// Estimates the measurements of a ride that has no odometer data.
    ///
    /// Distance is the great-circle distance between pickup and destination
    /// scaled by a road factor; duration assumes 25 km/h.
    #[must_use]
    pub fn estimate(ride: &Ride) -> Self {
        let straight = haversine_m(ride.pickup_lat, ride.pickup_lng, ride.dest_lat, ride.dest_lng);
        let distance_m = (straight * Self::ROAD_FACTOR).round();
        let duration_s = (distance_m / 1000.0 / Self::AVERAGE_SPEED_KMH * 3600.0).round();

        Self {
            distance_m: distance_m as u64,
            duration_s: duration_s as u64,
        }
    }
}

/// Great-circle distance in metres.
fn haversine_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;

    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    EARTH_RADIUS_M * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Body of `POST /v1/payments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePayment {
    /// Completed trip.
    pub trip_id: TripId,
    /// Payment method.
    pub payment_method: PaymentMethod,
}

// ============================================================================
// Responses
// ============================================================================

/// A trip as returned by the trip endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    /// Trip identity.
    pub id: TripId,
    /// Ride this trip fulfils.
    pub ride_id: RideId,
    /// Driving driver.
    pub driver_id: DriverId,
    /// Rider.
    pub rider_id: RiderId,
    /// Trip status.
    pub status: String,
    /// Start time.
    pub started_at: DateTime<Utc>,
    /// End time, once completed.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Distance in metres.
    #[serde(default)]
    pub distance_m: u64,
    /// Duration in seconds.
    #[serde(default)]
    pub duration_s: u64,
    /// Flag-down fare.
    #[serde(default)]
    pub base_fare: f64,
    /// Distance component.
    #[serde(default)]
    pub distance_fare: f64,
    /// Time component.
    #[serde(default)]
    pub time_fare: f64,
    /// Surge multiplier applied.
    #[serde(default)]
    pub surge_multiplier: f64,
    /// Total fare.
    #[serde(default)]
    pub total_fare: f64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A payment as returned by `POST /v1/payments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment identity.
    pub id: PaymentId,
    /// Paid trip.
    pub trip_id: TripId,
    /// Paying rider.
    pub rider_id: RiderId,
    /// Charged amount.
    pub amount: f64,
    /// Method used.
    pub payment_method: String,
    /// PSP status.
    pub status: String,
    /// PSP reference.
    #[serde(default)]
    pub psp_transaction_id: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_create_ride_wire_shape() {
        let body = CreateRide {
            rider_id: RiderId::new("rider-1"),
            pickup_lat: 12.97,
            pickup_lng: 77.59,
            pickup_address: None,
            dest_lat: 12.93,
            dest_lng: 77.62,
            dest_address: Some("Koramangala".to_string()),
            vehicle_type: VehicleType::Suv,
            payment_method: PaymentMethod::Wallet,
        };

        let value = serde_json::to_value(&body).expect("serialize");
        assert_eq!(value["vehicle_type"], "suv");
        assert_eq!(value["payment_method"], "wallet");
        assert_eq!(value["dest_address"], "Koramangala");
        assert!(value.get("pickup_address").is_none());
    }

    #[test]
    fn test_trip_decodes_open_trip() {
        let trip: Trip = serde_json::from_value(json!({
            "id": "t1",
            "ride_id": "r1",
            "driver_id": "d1",
            "rider_id": "u1",
            "status": "in_progress",
            "started_at": "2025-01-15T09:40:00Z",
            "completed_at": null,
            "distance_m": 0,
            "duration_s": 0,
            "base_fare": 50.0,
            "distance_fare": 0.0,
            "time_fare": 0.0,
            "surge_multiplier": 1.0,
            "total_fare": 0.0,
            "created_at": "2025-01-15T09:40:00Z"
        }))
        .expect("trip");

        assert_eq!(trip.ride_id, RideId::new("r1"));
        assert!(trip.completed_at.is_none());
    }

    #[test]
    fn test_end_trip_estimate() {
        // MG Road to Koramangala: about 5.2 km straight line.
        let estimate = EndTrip::estimate(&crate::test_support::ride("r1", "in_progress"));

        assert!((6400..6900).contains(&estimate.distance_m), "{estimate:?}");
        let expected_s = (estimate.distance_m as f64 / 1000.0 / 25.0 * 3600.0).round() as u64;
        assert!(estimate.duration_s.abs_diff(expected_s) <= 1);
    }

    #[test]
    fn test_end_trip_estimate_same_point_is_zero() {
        let mut ride = crate::test_support::ride("r1", "in_progress");
        ride.dest_lat = ride.pickup_lat;
        ride.dest_lng = ride.pickup_lng;

        assert_eq!(
            EndTrip::estimate(&ride),
            EndTrip {
                distance_m: 0,
                duration_s: 0
            }
        );
    }

    #[test]
    fn test_payment_method_default_is_cash() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
        assert_eq!(PaymentMethod::Card.to_string(), "card");
    }
}
