//! Push event envelope and typed events.
//!
//! The server pushes flat JSON objects with a string discriminator:
//!
//! ```json
//! { "type": "ride:offered", "ride_id": "…", "driver_id": "…", "offer_id": "…" }
//! ```
//!
//! Decoding happens in two steps: [`Envelope::from_text`] checks the frame is
//! a JSON object with a `type`, then [`Envelope::parse`] validates and
//! defaults the fields of the known kinds into a [`PushEvent`]. Optional
//! fields that are missing or of the wrong JSON type become `None`; a missing
//! identity makes the frame malformed.
//!
//! # Event Kinds
//!
//! | Kind | Variant |
//! |------|---------|
//! | `ride:requested` | [`PushEvent::RideRequested`] |
//! | `ride:offered` | [`PushEvent::RideOffered`] |
//! | `ride:no_drivers` | [`PushEvent::RideNoDrivers`] |
//! | `ride:matched` | [`PushEvent::RideMatched`] |
//! | `ride:started` | [`PushEvent::RideStarted`] |
//! | `ride:completed` | [`PushEvent::RideCompleted`] |
//! | `ride:cancelled` | [`PushEvent::RideCancelled`] |
//! | `driver:location_update` | [`PushEvent::DriverLocationUpdate`] |
//! | `driver:status_changed` | [`PushEvent::DriverStatusChanged`] |
//! | `pong` | [`PushEvent::Pong`] |

// ============================================================================
// Imports
// ============================================================================

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value, from_str};

use crate::error::{Error, Result};
use crate::identifiers::{DriverId, RideId, RiderId, TripId};
use crate::model::{DriverStatus, Ride, RideStatus};

// ============================================================================
// Constants
// ============================================================================

/// Vehicle class assumed when a `ride:requested` frame omits it.
const DEFAULT_VEHICLE_TYPE: &str = "mini";

/// Payment method assumed for rides first seen on the push channel.
const DEFAULT_PAYMENT_METHOD: &str = "cash";

// ============================================================================
// Envelope
// ============================================================================

/// A raw inbound frame: discriminator plus flat fields.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    /// Event kind discriminator.
    #[serde(rename = "type")]
    pub kind: String,

    /// All other top-level fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Envelope {
    /// Parses a text frame into an envelope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the text is not a JSON object with a
    /// string `type` field.
    pub fn from_text(text: &str) -> Result<Self> {
        Ok(from_str(text)?)
    }

    /// Validates the envelope into a typed event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the kind is unknown or a required field
    /// is missing.
    pub fn parse(&self) -> Result<PushEvent> {
        let event = match self.kind.as_str() {
            "ride:requested" => PushEvent::RideRequested(RideRequested {
                ride_id: self.ride_id()?,
                rider_id: self.get_optional_string("rider_id").map(RiderId::from),
                pickup_lat: self.get_f64("pickup_lat"),
                pickup_lng: self.get_f64("pickup_lng"),
                pickup_address: self.get_optional_string("pickup_address"),
                dest_lat: self.get_f64("dest_lat"),
                dest_lng: self.get_f64("dest_lng"),
                dest_address: self.get_optional_string("dest_address"),
                vehicle_type: self.get_string_or("vehicle_type", DEFAULT_VEHICLE_TYPE),
                surge_multiplier: self.get_optional_f64("surge_multiplier").unwrap_or(1.0),
                estimated_fare: self.get_optional_f64("estimated_fare"),
            }),

            "ride:offered" => PushEvent::RideOffered {
                ride_id: self.ride_id()?,
                driver_id: self.matched_driver(),
                estimated_fare: self.get_optional_f64("estimated_fare"),
            },

            "ride:no_drivers" => PushEvent::RideNoDrivers {
                ride_id: self.ride_id()?,
                reason: self.get_optional_string("reason"),
            },

            "ride:matched" => PushEvent::RideMatched {
                ride_id: self.ride_id()?,
                status: self.ride_status(),
                driver_id: self.matched_driver(),
                estimated_fare: self.get_optional_f64("estimated_fare"),
            },

            "ride:started" => PushEvent::RideStarted {
                ride_id: self.ride_id()?,
                status: self.ride_status(),
                trip_id: self.get_optional_string("trip_id").map(TripId::from),
            },

            "ride:completed" => PushEvent::RideCompleted {
                ride_id: self.ride_id()?,
                status: self.ride_status(),
                trip_id: self.get_optional_string("trip_id").map(TripId::from),
                total_fare: self.get_optional_f64("total_fare"),
            },

            "ride:cancelled" => PushEvent::RideCancelled {
                ride_id: self.ride_id()?,
                reason: self.get_optional_string("reason"),
            },

            "driver:location_update" => PushEvent::DriverLocationUpdate {
                driver_id: self.driver_id()?,
                lat: self.require_f64("lat")?,
                lng: self.require_f64("lng")?,
            },

            "driver:status_changed" => PushEvent::DriverStatusChanged {
                driver_id: self.driver_id()?,
                status: self
                    .get_optional_string("status")
                    .or_else(|| self.get_optional_string("new_status"))
                    .map(DriverStatus::from)
                    .ok_or_else(|| Error::decode("driver:status_changed without status"))?,
            },

            "pong" => PushEvent::Pong,

            other => return Err(Error::decode(format!("unknown event kind: {other}"))),
        };

        Ok(event)
    }
}

// ============================================================================
// Field Accessors
// ============================================================================

impl Envelope {
    /// Gets a non-empty string field.
    #[inline]
    fn get_optional_string(&self, key: &str) -> Option<String> {
        self.fields
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    }

    /// Gets a string field with default.
    #[inline]
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_optional_string(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Gets a numeric field.
    #[inline]
    fn get_optional_f64(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(|v| v.as_f64())
    }

    /// Gets a numeric field, defaulting to zero.
    #[inline]
    fn get_f64(&self, key: &str) -> f64 {
        self.get_optional_f64(key).unwrap_or_default()
    }

    /// Gets a numeric field that must be present.
    fn require_f64(&self, key: &str) -> Result<f64> {
        self.get_optional_f64(key)
            .ok_or_else(|| Error::decode(format!("{}: missing numeric field {key}", self.kind)))
    }

    fn ride_id(&self) -> Result<RideId> {
        self.get_optional_string("ride_id")
            .map(RideId::from)
            .ok_or_else(|| Error::decode(format!("{}: missing ride_id", self.kind)))
    }

    fn driver_id(&self) -> Result<DriverId> {
        self.get_optional_string("driver_id")
            .map(DriverId::from)
            .ok_or_else(|| Error::decode(format!("{}: missing driver_id", self.kind)))
    }

    /// Driver reference under either payload alias.
    fn matched_driver(&self) -> Option<DriverId> {
        self.get_optional_string("matched_driver_id")
            .or_else(|| self.get_optional_string("driver_id"))
            .map(DriverId::from)
    }

    fn ride_status(&self) -> Option<RideStatus> {
        self.get_optional_string("status").map(RideStatus::from)
    }
}

// ============================================================================
// PushEvent
// ============================================================================

/// Typed push event.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    /// A ride was requested (possibly by another viewer).
    RideRequested(RideRequested),

    /// A ride was offered to a driver.
    RideOffered {
        /// Ride.
        ride_id: RideId,
        /// Offered driver.
        driver_id: Option<DriverId>,
        /// Fare estimate, if sent.
        estimated_fare: Option<f64>,
    },

    /// Matching gave up.
    RideNoDrivers {
        /// Ride.
        ride_id: RideId,
        /// Server reason code.
        reason: Option<String>,
    },

    /// A driver accepted.
    RideMatched {
        /// Ride.
        ride_id: RideId,
        /// Server-supplied status, if any.
        status: Option<RideStatus>,
        /// Matched driver.
        driver_id: Option<DriverId>,
        /// Fare estimate, if sent.
        estimated_fare: Option<f64>,
    },

    /// The trip started.
    RideStarted {
        /// Ride.
        ride_id: RideId,
        /// Server-supplied status, if any.
        status: Option<RideStatus>,
        /// Started trip.
        trip_id: Option<TripId>,
    },

    /// The trip ended.
    RideCompleted {
        /// Ride.
        ride_id: RideId,
        /// Server-supplied status, if any.
        status: Option<RideStatus>,
        /// Finished trip.
        trip_id: Option<TripId>,
        /// Final fare.
        total_fare: Option<f64>,
    },

    /// The ride was cancelled.
    RideCancelled {
        /// Ride.
        ride_id: RideId,
        /// Server reason code.
        reason: Option<String>,
    },

    /// A driver moved.
    DriverLocationUpdate {
        /// Driver.
        driver_id: DriverId,
        /// Latitude.
        lat: f64,
        /// Longitude.
        lng: f64,
    },

    /// A driver changed availability.
    DriverStatusChanged {
        /// Driver.
        driver_id: DriverId,
        /// New status.
        status: DriverStatus,
    },

    /// Heartbeat acknowledgement.
    Pong,
}

impl PushEvent {
    /// Decodes a text frame in one step.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON, unknown kinds and missing
    /// required fields.
    pub fn decode(text: &str) -> Result<Self> {
        Envelope::from_text(text)?.parse()
    }

    /// Returns the wire discriminator.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RideRequested(_) => "ride:requested",
            Self::RideOffered { .. } => "ride:offered",
            Self::RideNoDrivers { .. } => "ride:no_drivers",
            Self::RideMatched { .. } => "ride:matched",
            Self::RideStarted { .. } => "ride:started",
            Self::RideCompleted { .. } => "ride:completed",
            Self::RideCancelled { .. } => "ride:cancelled",
            Self::DriverLocationUpdate { .. } => "driver:location_update",
            Self::DriverStatusChanged { .. } => "driver:status_changed",
            Self::Pong => "pong",
        }
    }
}

// ============================================================================
// RideRequested
// ============================================================================

/// Payload of `ride:requested`, with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RideRequested {
    /// Ride.
    pub ride_id: RideId,
    /// Requesting rider.
    pub rider_id: Option<RiderId>,
    /// Pickup latitude.
    pub pickup_lat: f64,
    /// Pickup longitude.
    pub pickup_lng: f64,
    /// Pickup display address.
    pub pickup_address: Option<String>,
    /// Destination latitude.
    pub dest_lat: f64,
    /// Destination longitude.
    pub dest_lng: f64,
    /// Destination display address.
    pub dest_address: Option<String>,
    /// Vehicle class.
    pub vehicle_type: String,
    /// Surge multiplier.
    pub surge_multiplier: f64,
    /// Fare estimate.
    pub estimated_fare: Option<f64>,
}

impl RideRequested {
    /// Builds the ride this event describes, in `matching` status.
    #[must_use]
    pub fn into_ride(self, created_at: DateTime<Utc>) -> Ride {
        Ride {
            id: self.ride_id,
            rider_id: self.rider_id,
            status: RideStatus::Matching,
            pickup_lat: self.pickup_lat,
            pickup_lng: self.pickup_lng,
            pickup_address: self.pickup_address,
            dest_lat: self.dest_lat,
            dest_lng: self.dest_lng,
            dest_address: self.dest_address,
            vehicle_type: self.vehicle_type,
            payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
            surge_multiplier: self.surge_multiplier,
            estimated_fare: self.estimated_fare,
            matched_driver_id: None,
            trip_id: None,
            total_fare: None,
            created_at,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offered_accepts_driver_id_alias() {
        let event = PushEvent::decode(
            r#"{"type":"ride:offered","ride_id":"r1","driver_id":"d1","driver_name":"Asha"}"#,
        )
        .expect("decode");

        assert_eq!(
            event,
            PushEvent::RideOffered {
                ride_id: RideId::new("r1"),
                driver_id: Some(DriverId::new("d1")),
                estimated_fare: None,
            }
        );
    }

    #[test]
    fn test_offered_prefers_matched_driver_id() {
        let event = PushEvent::decode(
            r#"{"type":"ride:offered","ride_id":"r1","matched_driver_id":"d2","driver_id":"d1","estimated_fare":210.5}"#,
        )
        .expect("decode");

        match event {
            PushEvent::RideOffered {
                driver_id,
                estimated_fare,
                ..
            } => {
                assert_eq!(driver_id, Some(DriverId::new("d2")));
                assert_eq!(estimated_fare, Some(210.5));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_requested_applies_defaults() {
        let event = PushEvent::decode(r#"{"type":"ride:requested","ride_id":"r1"}"#)
            .expect("decode");

        let PushEvent::RideRequested(requested) = event else {
            panic!("expected RideRequested");
        };
        let ride = requested.into_ride(Utc::now());

        assert_eq!(ride.status, RideStatus::Matching);
        assert_eq!(ride.vehicle_type, "mini");
        assert_eq!(ride.payment_method, "cash");
        assert_eq!(ride.surge_multiplier, 1.0);
        assert_eq!(ride.pickup_lat, 0.0);
        assert!(ride.estimated_fare.is_none());
    }

    #[test]
    fn test_null_optional_fields_decode_as_none() {
        let event = PushEvent::decode(
            r#"{"type":"ride:requested","ride_id":"r1","estimated_fare":null,"vehicle_type":"suv"}"#,
        )
        .expect("decode");

        let PushEvent::RideRequested(requested) = event else {
            panic!("expected RideRequested");
        };
        assert!(requested.estimated_fare.is_none());
        assert_eq!(requested.vehicle_type, "suv");
    }

    #[test]
    fn test_status_changed_accepts_new_status_alias() {
        let event = PushEvent::decode(
            r#"{"type":"driver:status_changed","driver_id":"d1","old_status":"available","new_status":"busy"}"#,
        )
        .expect("decode");

        assert_eq!(
            event,
            PushEvent::DriverStatusChanged {
                driver_id: DriverId::new("d1"),
                status: DriverStatus::Busy,
            }
        );
    }

    #[test]
    fn test_location_update_requires_coordinates() {
        let err = PushEvent::decode(r#"{"type":"driver:location_update","driver_id":"d1","lat":1.0}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_missing_ride_id_is_malformed() {
        assert!(PushEvent::decode(r#"{"type":"ride:cancelled"}"#).is_err());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = PushEvent::decode(r#"{"type":"surge:update","zone":"z1"}"#).unwrap_err();
        assert!(err.to_string().contains("surge:update"));
    }

    #[test]
    fn test_non_json_and_non_object_frames_are_rejected() {
        assert!(PushEvent::decode("pong").is_err());
        assert!(PushEvent::decode("[1,2,3]").is_err());
        assert!(PushEvent::decode(r#"{"kind":"pong"}"#).is_err());
        assert!(PushEvent::decode(r#"{"type":7}"#).is_err());
    }

    #[test]
    fn test_pong() {
        let event = PushEvent::decode(r#"{"type":"pong"}"#).expect("decode");
        assert_eq!(event, PushEvent::Pong);
        assert_eq!(event.kind(), "pong");
    }

    #[test]
    fn test_completed_keeps_server_status() {
        let event = PushEvent::decode(
            r#"{"type":"ride:completed","ride_id":"r1","trip_id":"t1","total_fare":342.0,"distance_m":5100}"#,
        )
        .expect("decode");

        assert_eq!(
            event,
            PushEvent::RideCompleted {
                ride_id: RideId::new("r1"),
                status: None,
                trip_id: Some(TripId::new("t1")),
                total_fare: Some(342.0),
            }
        );
    }
}
