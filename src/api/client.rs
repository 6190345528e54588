//! Typed HTTP client for the dispatch API.
//!
//! Every call maps a non-success status to [`Error::Http`] carrying the
//! status and the response body. Create calls send a fresh
//! `Idempotency-Key` unless the caller supplies one for a retry.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::from_str;
use tracing::{debug, trace};
use url::Url;
use uuid::Uuid;

use super::types::{CreatePayment, CreateRide, EndTrip, LocationUpdate, OfferResponse, Payment, Trip};
use crate::error::{Error, Result};
use crate::identifiers::{DriverId, RideId, TripId};
use crate::model::{Driver, Ride};
use crate::sync::SnapshotSource;

// ============================================================================
// Constants
// ============================================================================

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the client-chosen deduplication key.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

// ============================================================================
// Path Segments
// ============================================================================

/// Percent-encodes an id so it always stays one path segment.
fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

// ============================================================================
// ApiClient
// ============================================================================

/// Client for the `/v1` dispatch endpoints.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl ApiClient {
    /// Creates a client rooted at `base_url` (e.g. `https://host/api`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Request`] if the HTTP client cannot be constructed.
    pub fn new(base_url: &Url, auth_token: Option<String>) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_http_client(http, base_url, auth_token))
    }

    /// Creates a client over a preconfigured `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(http: Client, base_url: &Url, auth_token: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            auth_token,
        }
    }

    /// Returns the base URL without a trailing slash.
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================================================================
    // Rides
    // ========================================================================

    /// Requests a ride under a fresh idempotency key.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn create_ride(&self, body: &CreateRide) -> Result<Ride> {
        self.create_ride_with_key(body, &Uuid::new_v4().to_string())
            .await
    }

    /// Requests a ride under a caller-chosen idempotency key.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn create_ride_with_key(&self, body: &CreateRide, key: &str) -> Result<Ride> {
        let request = self
            .http
            .post(self.endpoint("/v1/rides"))
            .header(IDEMPOTENCY_HEADER, key)
            .json(body);
        self.execute(request).await
    }

    /// Lists every ride.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn list_rides(&self) -> Result<Vec<Ride>> {
        self.execute(self.http.get(self.endpoint("/v1/rides")))
            .await
    }

    /// Fetches one ride.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn get_ride(&self, ride_id: &RideId) -> Result<Ride> {
        let ride = segment(ride_id.as_str());
        self.execute(self.http.get(self.endpoint(&format!("/v1/rides/{ride}"))))
            .await
    }

    /// Cancels a ride.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn cancel_ride(&self, ride_id: &RideId) -> Result<Ride> {
        let ride = segment(ride_id.as_str());
        self.execute(self.http.post(self.endpoint(&format!("/v1/rides/{ride}/cancel"))))
            .await
    }

    // ========================================================================
    // Drivers
    // ========================================================================

    /// Lists every driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn list_drivers(&self) -> Result<Vec<Driver>> {
        self.execute(self.http.get(self.endpoint("/v1/drivers")))
            .await
    }

    /// Fetches one driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn get_driver(&self, driver_id: &DriverId) -> Result<Driver> {
        let driver = segment(driver_id.as_str());
        self.execute(self.http.get(self.endpoint(&format!("/v1/drivers/{driver}"))))
            .await
    }

    /// Reports a driver's position.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn update_driver_location(
        &self,
        driver_id: &DriverId,
        lat: f64,
        lng: f64,
    ) -> Result<Driver> {
        let driver = segment(driver_id.as_str());
        let request = self
            .http
            .post(self.endpoint(&format!("/v1/drivers/{driver}/location")))
            .json(&LocationUpdate { lat, lng });
        self.execute(request).await
    }

    /// Accepts or declines an offered ride on behalf of a driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn respond_to_offer(
        &self,
        driver_id: &DriverId,
        ride_id: &RideId,
        accept: bool,
    ) -> Result<Ride> {
        let driver = segment(driver_id.as_str());
        let request = self
            .http
            .post(self.endpoint(&format!("/v1/drivers/{driver}/accept")))
            .json(&OfferResponse {
                ride_id: ride_id.clone(),
                accept,
            });
        self.execute(request).await
    }

    // ========================================================================
    // Trips
    // ========================================================================

    /// Starts the trip for an accepted ride.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn start_trip(&self, ride_id: &RideId) -> Result<Trip> {
        let ride = segment(ride_id.as_str());
        self.execute(self.http.post(self.endpoint(&format!("/v1/trips/{ride}/start"))))
            .await
    }

    /// Fetches one trip.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn get_trip(&self, trip_id: &TripId) -> Result<Trip> {
        let trip = segment(trip_id.as_str());
        self.execute(self.http.get(self.endpoint(&format!("/v1/trips/{trip}"))))
            .await
    }

    /// Ends a trip with its measured distance and duration.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn end_trip(&self, trip_id: &TripId, body: &EndTrip) -> Result<Trip> {
        let trip = segment(trip_id.as_str());
        let request = self
            .http
            .post(self.endpoint(&format!("/v1/trips/{trip}/end")))
            .json(body);
        self.execute(request).await
    }

    // ========================================================================
    // Payments
    // ========================================================================

    /// Pays for a trip under a fresh idempotency key.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn create_payment(&self, body: &CreatePayment) -> Result<Payment> {
        self.create_payment_with_key(body, &Uuid::new_v4().to_string())
            .await
    }

    /// Pays for a trip under a caller-chosen idempotency key.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn create_payment_with_key(&self, body: &CreatePayment, key: &str) -> Result<Payment> {
        let request = self
            .http
            .post(self.endpoint("/v1/payments"))
            .header(IDEMPOTENCY_HEADER, key)
            .json(body);
        self.execute(request).await
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Authenticates, sends, checks status and decodes the body.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let request = match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let url = response.url().clone();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(%url, status = status.as_u16(), "API call rejected");
            return Err(Error::http(status.as_u16(), body));
        }

        trace!(%url, status = status.as_u16(), len = body.len(), "API call succeeded");
        Ok(from_str(&body)?)
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.auth_token.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SnapshotSource for ApiClient {
    async fn fetch_rides(&self) -> Result<Vec<Ride>> {
        self.list_rides().await
    }

    async fn fetch_drivers(&self) -> Result<Vec<Driver>> {
        self.list_drivers().await
    }
}

// ============================================================================
// Tests
// ============================================================================
