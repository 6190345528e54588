//! Shared test fixtures.

use serde_json::json;

use crate::model::{Driver, Ride};

/// A ride in `status` with plausible Bengaluru coordinates.
pub(crate) fn ride(id: &str, status: &str) -> Ride {
    serde_json::from_value(json!({
        "id": id,
        "rider_id": "rider-1",
        "status": status,
        "pickup_lat": 12.9716,
        "pickup_lng": 77.5946,
        "pickup_address": "MG Road",
        "dest_lat": 12.9352,
        "dest_lng": 77.6245,
        "dest_address": "Koramangala",
        "vehicle_type": "sedan",
        "payment_method": "card",
        "surge_multiplier": 1.2,
        "estimated_fare": 180.0,
        "created_at": "2025-01-15T09:30:00Z"
    }))
    .expect("ride fixture")
}

/// A driver in `status` at a fixed location.
pub(crate) fn driver(id: &str, status: &str) -> Driver {
    serde_json::from_value(json!({
        "id": id,
        "name": format!("Driver {id}"),
        "email": format!("{id}@example.com"),
        "phone": "+91-9000000000",
        "vehicle_type": "sedan",
        "status": status,
        "current_lat": 12.97,
        "current_lng": 77.59,
        "rating": 4.8,
        "created_at": "2025-01-01T00:00:00Z"
    }))
    .expect("driver fixture")
}
