//! Sync client: wiring, store access and the command façade.
//!
//! The client owns both stores, the notification queue, the connection
//! manager and the HTTP client. Push frames and command responses converge
//! on the same stores; whichever arrives first wins field by field.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::future::try_join_all;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::Url;

use crate::api::{ApiClient, CreatePayment, CreateRide, EndTrip, Payment, PaymentMethod, Trip};
use crate::error::Result;
use crate::identifiers::{DriverId, RideId, TripId};
use crate::model::{Driver, Ride, RidePatch, RideStatus};
use crate::notification::{NotificationQueue, Severity};
use crate::store::{DriverStore, RideStore};
use crate::sync::{EventRouter, SnapshotReconciler, SnapshotSource};
use crate::transport::{ConnectionManager, ConnectionState, Connector, FrameHandler, WsConnector};

use super::builder::SyncClientBuilder;
use super::config::ClientConfig;

// ============================================================================
// SessionHandler
// ============================================================================

/// Bridges session callbacks to the router and the reconciler.
struct SessionHandler {
    router: EventRouter,
    reconciler: Arc<SnapshotReconciler>,
}

impl FrameHandler for SessionHandler {
    fn on_open(&self) {
        let reconciler = Arc::clone(&self.reconciler);
        tokio::spawn(async move {
            reconciler.reconcile().await;
        });
    }

    fn on_frame(&self, text: &str) {
        self.router.route(text);
    }
}

// ============================================================================
// SyncClient
// ============================================================================

/// Live view of rides and drivers, kept in sync with the dispatch server.
///
/// # Example
///
/// ```no_run
/// use rideflux_sync::SyncClient;
///
/// # async fn example() -> rideflux_sync::Result<()> {
/// let client = SyncClient::builder()
///     .origin("http://localhost:8000")
///     .build()?;
///
/// client.connect().await;
/// println!("{} rides", client.rides().len());
/// client.shutdown().await;
/// # Ok(())
/// # }
/// ```
pub struct SyncClient {
    config: ClientConfig,
    push_url: Url,
    api: ApiClient,
    rides: Arc<RideStore>,
    drivers: Arc<DriverStore>,
    notifications: NotificationQueue,
    reconciler: Arc<SnapshotReconciler>,
    manager: ConnectionManager,
    torn_down: Arc<AtomicBool>,
}

impl SyncClient {
    /// Creates a new builder.
    #[inline]
    #[must_use]
    pub fn builder() -> SyncClientBuilder {
        SyncClientBuilder::new()
    }

    /// Wires a client from validated configuration.
    pub(crate) fn new(
        config: ClientConfig,
        connector: Option<Arc<dyn Connector>>,
        snapshot_source: Option<Arc<dyn SnapshotSource>>,
        http_client: Option<reqwest::Client>,
    ) -> Result<Self> {
        let push_url = config.push_url()?;
        let api = match http_client {
            Some(http) => ApiClient::with_http_client(http, &config.api_base_url, config.auth_token.clone()),
            None => ApiClient::new(&config.api_base_url, config.auth_token.clone())?,
        };

        let rides = Arc::new(RideStore::new("ride"));
        let drivers = Arc::new(DriverStore::new("driver"));
        let notifications = NotificationQueue::with_ttl(config.notification_ttl);
        let torn_down = Arc::new(AtomicBool::new(false));

        let source: Arc<dyn SnapshotSource> = match snapshot_source {
            Some(source) => source,
            None => Arc::new(api.clone()),
        };
        let reconciler = Arc::new(SnapshotReconciler::new(
            source,
            Arc::clone(&rides),
            Arc::clone(&drivers),
            Arc::clone(&torn_down),
        ));

        let handler = SessionHandler {
            router: EventRouter::new(
                Arc::clone(&rides),
                Arc::clone(&drivers),
                notifications.clone(),
                Arc::clone(&torn_down),
            ),
            reconciler: Arc::clone(&reconciler),
        };

        let connector: Arc<dyn Connector> = match connector {
            Some(connector) => connector,
            None => Arc::new(WsConnector),
        };
        let manager = ConnectionManager::new(connector, Arc::new(handler), config.policy.clone());

        debug!(push_url = %push_url, api = %api.base_url(), "Sync client created");

        Ok(Self {
            config,
            push_url,
            api,
            rides,
            drivers,
            notifications,
            reconciler,
            manager,
            torn_down,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Returns the ride store.
    #[inline]
    #[must_use]
    pub fn rides(&self) -> &RideStore {
        &self.rides
    }

    /// Returns the driver store.
    #[inline]
    #[must_use]
    pub fn drivers(&self) -> &DriverStore {
        &self.drivers
    }

    /// Returns the notification queue.
    #[inline]
    #[must_use]
    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    /// Returns the HTTP client.
    #[inline]
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Returns the resolved configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the push channel URL.
    #[inline]
    #[must_use]
    pub fn push_url(&self) -> &Url {
        &self.push_url
    }

    /// Returns the push channel state.
    #[inline]
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.manager.state()
    }

    /// Subscribes to push channel state changes.
    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.manager.subscribe()
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has been called.
    #[inline]
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Opens (or reopens) the push channel.
    ///
    /// Every transition into `Open` triggers a full snapshot.
    pub async fn connect(&self) {
        if self.is_shut_down() {
            warn!("connect() after shutdown ignored");
            return;
        }
        self.manager.connect(self.push_url.clone()).await;
    }

    /// Closes the push channel without reconnecting. Stores keep their data.
    pub async fn disconnect(&self) {
        self.manager.disconnect().await;
    }

    /// Fetches a fresh snapshot now.
    ///
    /// Returns `true` if both stores were replaced.
    pub async fn refresh(&self) -> bool {
        self.reconciler.reconcile().await
    }

    /// Tears the client down.
    ///
    /// Late frames, snapshots and command responses are ignored from this
    /// point; the push channel is closed and pending notifications are
    /// cleared. Commands still return the server's response.
    pub async fn shutdown(&self) {
        self.torn_down.store(true, Ordering::Release);
        self.manager.disconnect().await;
        self.notifications.clear();
        info!("Sync client shut down");
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Requests a ride and inserts the created ride.
    ///
    /// # Errors
    ///
    /// Returns the API error; an `error` notification is also enqueued.
    pub async fn request_ride(&self, body: &CreateRide) -> Result<Ride> {
        let ride = self.report(self.api.create_ride(body).await)?;
        if !self.is_live("request_ride") {
            return Ok(ride);
        }

        self.rides.upsert(ride.clone());
        self.notifications
            .add(Severity::Success, "Ride requested successfully!");
        Ok(ride)
    }

    /// Cancels a ride.
    ///
    /// # Errors
    ///
    /// Returns the API error; an `error` notification is also enqueued.
    pub async fn cancel_ride(&self, ride_id: &RideId) -> Result<Ride> {
        let ride = self.report(self.api.cancel_ride(ride_id).await)?;
        if !self.is_live("cancel_ride") {
            return Ok(ride);
        }

        self.rides.upsert(ride.clone());
        self.rides
            .merge_update(ride_id, &RidePatch::status(RideStatus::Cancelled));
        Ok(ride)
    }

    /// Accepts (`accept = true`) or declines an offer on behalf of a driver.
    ///
    /// Locally the ride moves to `accepted`, or back to `matching`.
    ///
    /// # Errors
    ///
    /// Returns the API error; an `error` notification is also enqueued.
    pub async fn respond_to_offer(
        &self,
        driver_id: &DriverId,
        ride_id: &RideId,
        accept: bool,
    ) -> Result<Ride> {
        let ride = self.report(self.api.respond_to_offer(driver_id, ride_id, accept).await)?;
        if !self.is_live("respond_to_offer") {
            return Ok(ride);
        }

        let status = if accept {
            RideStatus::Accepted
        } else {
            RideStatus::Matching
        };
        self.rides.upsert(ride.clone());
        self.rides.merge_update(ride_id, &RidePatch::status(status));
        Ok(ride)
    }

    /// Starts the trip of an accepted ride.
    ///
    /// # Errors
    ///
    /// Returns the API error; an `error` notification is also enqueued.
    pub async fn start_trip(&self, ride_id: &RideId) -> Result<Trip> {
        let trip = self.report(self.api.start_trip(ride_id).await)?;
        if !self.is_live("start_trip") {
            return Ok(trip);
        }

        let patch = RidePatch::status(RideStatus::InProgress).with_trip(Some(trip.id.clone()));
        self.rides.merge_update(ride_id, &patch);
        Ok(trip)
    }

    /// Ends a trip with measured (or [estimated](EndTrip::estimate)) values.
    ///
    /// # Errors
    ///
    /// Returns the API error; an `error` notification is also enqueued.
    pub async fn end_trip(&self, ride_id: &RideId, trip_id: &TripId, measured: EndTrip) -> Result<Trip> {
        let trip = self.report(self.api.end_trip(trip_id, &measured).await)?;
        if !self.is_live("end_trip") {
            return Ok(trip);
        }

        let patch = RidePatch::status(RideStatus::Completed)
            .with_trip(Some(trip.id.clone()))
            .with_total_fare(Some(trip.total_fare));
        self.rides.merge_update(ride_id, &patch);
        Ok(trip)
    }

    /// Pays for a completed trip.
    ///
    /// # Errors
    ///
    /// Returns the API error; an `error` notification is also enqueued.
    pub async fn pay(&self, ride_id: &RideId, trip_id: &TripId, method: PaymentMethod) -> Result<Payment> {
        let body = CreatePayment {
            trip_id: trip_id.clone(),
            payment_method: method,
        };
        let payment = self.report(self.api.create_payment(&body).await)?;
        if !self.is_live("pay") {
            return Ok(payment);
        }

        self.rides
            .merge_update(ride_id, &RidePatch::status(RideStatus::Paid));
        self.notifications
            .add(Severity::Success, "Payment processed!");
        Ok(payment)
    }

    /// Reports one driver's position and merges the response.
    ///
    /// # Errors
    ///
    /// Returns the API error; an `error` notification is also enqueued.
    pub async fn update_driver_location(&self, driver_id: &DriverId, lat: f64, lng: f64) -> Result<Driver> {
        let driver = self.report(self.api.update_driver_location(driver_id, lat, lng).await)?;
        if !self.is_live("update_driver_location") {
            return Ok(driver);
        }
        self.drivers.upsert(driver.clone());
        Ok(driver)
    }

    /// Re-posts the known position of every located driver.
    ///
    /// Returns the number of drivers refreshed.
    ///
    /// # Errors
    ///
    /// Returns the first API error; an `error` notification is also enqueued.
    pub async fn refresh_driver_locations(&self) -> Result<usize> {
        let located: Vec<(DriverId, (f64, f64))> = self
            .drivers
            .list_all()
            .into_iter()
            .filter_map(|d| d.location().map(|loc| (d.id, loc)))
            .collect();

        let updates = located
            .iter()
            .map(|(id, (lat, lng))| self.api.update_driver_location(id, *lat, *lng));
        let refreshed = self.report(try_join_all(updates).await)?;

        let count = refreshed.len();
        if !self.is_live("refresh_driver_locations") {
            return Ok(count);
        }
        for driver in refreshed {
            self.drivers.upsert(driver);
        }

        self.notifications.add(
            Severity::Success,
            format!("Refreshed locations for {count} drivers"),
        );
        Ok(count)
    }

    /// Enqueues an `error` notification for a failed command.
    fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            warn!(error = %e, "Command failed");
            if self.is_live("report") {
                self.notifications.add(Severity::Error, e.to_string());
            }
        }
        result
    }

    /// Returns `false` once torn down; late responses then leave the stores
    /// and the queue untouched.
    fn is_live(&self, command: &'static str) -> bool {
        if self.is_shut_down() {
            debug!(command, "Response after shutdown not applied");
            return false;
        }
        true
    }
}

impl fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncClient")
            .field("push_url", &self.push_url.as_str())
            .field("state", &self.manager.state())
            .field("rides", &self.rides.len())
            .field("drivers", &self.drivers.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use async_trait::async_trait;

    use crate::api::VehicleType;
    use crate::api::client::tests::{ride_json, serve};
    use crate::identifiers::RiderId;
    use crate::test_support::{driver, ride};
    use crate::transport::mock::MockConnector;

    struct FixedSource;

    #[async_trait]
    impl SnapshotSource for FixedSource {
        async fn fetch_rides(&self) -> Result<Vec<Ride>> {
            Ok(vec![ride("r1", "matching"), ride("r2", "pending")])
        }

        async fn fetch_drivers(&self) -> Result<Vec<Driver>> {
            Ok(vec![
                driver("d1", "available"),
                driver("d2", "busy"),
                driver("d3", "offline"),
            ])
        }
    }

    fn client_with(api_base: &Url, connector: &MockConnector) -> SyncClient {
        SyncClient::builder()
            .origin("http://localhost:8000")
            .api_base_url(api_base.as_str())
            .connector(Arc::new(connector.clone()))
            .snapshot_source(Arc::new(FixedSource))
            .http_client(reqwest::Client::builder().no_proxy().build().expect("http"))
            .build()
            .expect("client")
    }

    fn offline_client() -> SyncClient {
        let base = Url::parse("http://127.0.0.1:9/api").expect("url");
        client_with(&base, &MockConnector::new())
    }

    async fn eventually(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached");
    }

    fn trip_json(status: &str, total_fare: f64) -> String {
        serde_json::json!({
            "id": "t1", "ride_id": "r1", "driver_id": "d1", "rider_id": "rider-1",
            "status": status,
            "started_at": "2025-01-15T09:40:00Z",
            "completed_at": null,
            "distance_m": 0, "duration_s": 0,
            "base_fare": 50.0, "distance_fare": 0.0, "time_fare": 0.0,
            "surge_multiplier": 1.0, "total_fare": total_fare,
            "created_at": "2025-01-15T09:40:00Z"
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_push_url_derived_from_origin() {
        let client = offline_client();
        assert_eq!(client.push_url().as_str(), "ws://localhost:8000/ws/dashboard");
        assert_eq!(client.connection_state(), ConnectionState::Idle);
    }

    #[tokio::test]
    async fn test_open_triggers_snapshot_then_push_merges() {
        let connector = MockConnector::new();
        let remote = connector.push_accept();
        let base = Url::parse("http://127.0.0.1:9/api").expect("url");
        let client = client_with(&base, &connector);

        client.connect().await;
        eventually(|| client.rides().len() == 2 && client.drivers().len() == 3).await;
        assert_eq!(client.connection_state(), ConnectionState::Open);

        remote.deliver(r#"{"type":"ride:offered","ride_id":"r1","driver_id":"d1"}"#);
        eventually(|| {
            client
                .rides()
                .get(&RideId::new("r1"))
                .is_some_and(|r| r.status == RideStatus::Offered)
        })
        .await;
        assert_eq!(client.notifications().list()[0].message, "Ride r1 => offered");

        client.shutdown().await;
        assert!(client.is_shut_down());
        assert_eq!(client.connection_state(), ConnectionState::Idle);
        assert!(client.notifications().is_empty());
        assert!(remote.is_closed_locally());
    }

    #[tokio::test]
    async fn test_connect_after_shutdown_is_ignored() {
        let connector = MockConnector::new();
        let base = Url::parse("http://127.0.0.1:9/api").expect("url");
        let client = client_with(&base, &connector);

        client.shutdown().await;
        client.connect().await;

        assert_eq!(client.connection_state(), ConnectionState::Idle);
        assert!(connector.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_request_ride_inserts_and_notifies() {
        let (base, server) = serve(vec![(201, ride_json("r-new", "matching"))]).await;
        let client = client_with(&base, &MockConnector::new());

        let body = CreateRide {
            rider_id: RiderId::new("rider-1"),
            pickup_lat: 12.97,
            pickup_lng: 77.59,
            pickup_address: None,
            dest_lat: 12.93,
            dest_lng: 77.62,
            dest_address: None,
            vehicle_type: VehicleType::Sedan,
            payment_method: PaymentMethod::Card,
        };
        client.request_ride(&body).await.expect("request");

        assert!(client.rides().contains(&RideId::new("r-new")));
        let notes = client.notifications().list();
        assert_eq!(notes[0].severity, Severity::Success);
        assert_eq!(notes[0].message, "Ride requested successfully!");
        server.await.expect("server");
    }

    #[tokio::test]
    async fn test_push_before_response_coalesces() {
        let (base, server) = serve(vec![(201, ride_json("r-race", "matching"))]).await;
        let client = client_with(&base, &MockConnector::new());

        // The push event for the new ride overtakes the HTTP response.
        client.rides().insert_if_absent(ride("r-race", "offered"));

        let body = CreateRide {
            rider_id: RiderId::new("rider-1"),
            pickup_lat: 12.97,
            pickup_lng: 77.59,
            pickup_address: None,
            dest_lat: 12.93,
            dest_lng: 77.62,
            dest_address: None,
            vehicle_type: VehicleType::Mini,
            payment_method: PaymentMethod::Cash,
        };
        client.request_ride(&body).await.expect("request");

        assert_eq!(client.rides().len(), 1);
        server.await.expect("server");
    }

    #[tokio::test]
    async fn test_command_failure_notifies_error() {
        let (base, server) = serve(vec![(500, r#"{"detail":"boom"}"#.to_string())]).await;
        let client = client_with(&base, &MockConnector::new());
        client.rides().replace_all([ride("r1", "matching")]);

        let err = client.cancel_ride(&RideId::new("r1")).await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(
            client.rides().get(&RideId::new("r1")).expect("ride").status,
            RideStatus::Matching
        );
        let notes = client.notifications().list();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Error);
        assert!(notes[0].message.contains("boom"));
        server.await.expect("server");
    }

    #[tokio::test]
    async fn test_trip_lifecycle_updates_ride() {
        let payment = serde_json::json!({
            "id": "p1", "trip_id": "t1", "rider_id": "rider-1",
            "amount": 164.0, "payment_method": "card", "status": "completed",
            "psp_transaction_id": "psp-1", "created_at": "2025-01-15T10:05:00Z"
        });
        let (base, server) = serve(vec![
            (200, ride_json("r1", "accepted")),
            (200, trip_json("in_progress", 0.0)),
            (200, trip_json("completed", 164.0)),
            (201, payment.to_string()),
        ])
        .await;
        let client = client_with(&base, &MockConnector::new());
        client.rides().replace_all([ride("r1", "offered")]);
        let r1 = RideId::new("r1");

        client
            .respond_to_offer(&DriverId::new("d1"), &r1, true)
            .await
            .expect("accept");
        assert_eq!(client.rides().get(&r1).expect("ride").status, RideStatus::Accepted);

        let trip = client.start_trip(&r1).await.expect("start");
        let stored = client.rides().get(&r1).expect("ride");
        assert_eq!(stored.status, RideStatus::InProgress);
        assert_eq!(stored.trip_id.as_ref(), Some(&trip.id));

        let measured = EndTrip::estimate(&stored);
        client.end_trip(&r1, &trip.id, measured).await.expect("end");
        let stored = client.rides().get(&r1).expect("ride");
        assert_eq!(stored.status, RideStatus::Completed);
        assert_eq!(stored.total_fare, Some(164.0));

        client.pay(&r1, &trip.id, PaymentMethod::Card).await.expect("pay");
        assert_eq!(client.rides().get(&r1).expect("ride").status, RideStatus::Paid);
        assert_eq!(
            client.notifications().list().last().expect("note").message,
            "Payment processed!"
        );

        let requests = server.await.expect("server");
        assert!(requests[3].contains("idempotency-key:"));
        assert!(requests[3].contains(r#""payment_method":"card""#));
    }

    #[tokio::test]
    async fn test_decline_returns_ride_to_matching() {
        let (base, server) = serve(vec![(200, ride_json("r1", "offered"))]).await;
        let client = client_with(&base, &MockConnector::new());
        client.rides().replace_all([ride("r1", "offered")]);

        client
            .respond_to_offer(&DriverId::new("d1"), &RideId::new("r1"), false)
            .await
            .expect("decline");

        assert_eq!(
            client.rides().get(&RideId::new("r1")).expect("ride").status,
            RideStatus::Matching
        );
        server.await.expect("server");
    }

    #[tokio::test]
    async fn test_refresh_driver_locations_posts_located_drivers() {
        let moved = {
            let mut d = driver("d1", "available");
            d.current_lat = Some(13.01);
            d.current_lng = Some(77.61);
            serde_json::to_string(&d).expect("json")
        };
        let (base, server) = serve(vec![(200, moved)]).await;
        let client = client_with(&base, &MockConnector::new());

        let mut unlocated = driver("d2", "offline");
        unlocated.current_lat = None;
        unlocated.current_lng = None;
        client.drivers().replace_all([driver("d1", "available"), unlocated]);

        let count = client.refresh_driver_locations().await.expect("refresh");

        assert_eq!(count, 1);
        assert_eq!(
            client.drivers().get(&DriverId::new("d1")).expect("driver").location(),
            Some((13.01, 77.61))
        );
        assert_eq!(
            client.notifications().list()[0].message,
            "Refreshed locations for 1 drivers"
        );

        let requests = server.await.expect("server");
        assert!(requests[0].starts_with("post /api/v1/drivers/d1/location "));
    }

    #[tokio::test]
    async fn test_manual_refresh_uses_snapshot_source() {
        let client = offline_client();
        assert!(client.refresh().await);
        assert_eq!(client.rides().len(), 2);
        assert_eq!(client.drivers().len(), 3);
    }

    #[tokio::test]
    async fn test_responses_after_shutdown_leave_state_untouched() {
        let moved = serde_json::to_string(&driver("d1", "available")).expect("json");
        let (base, server) = serve(vec![
            (201, ride_json("r-late", "matching")),
            (200, moved),
            (200, trip_json("in_progress", 0.0)),
        ])
        .await;
        let client = client_with(&base, &MockConnector::new());
        client.shutdown().await;
        let versions = (client.rides().version(), client.drivers().version());

        let body = CreateRide {
            rider_id: RiderId::new("rider-1"),
            pickup_lat: 12.97,
            pickup_lng: 77.59,
            pickup_address: None,
            dest_lat: 12.93,
            dest_lng: 77.62,
            dest_address: None,
            vehicle_type: VehicleType::Mini,
            payment_method: PaymentMethod::Cash,
        };
        let ride = client.request_ride(&body).await.expect("request");
        assert_eq!(ride.id, RideId::new("r-late"));

        client
            .update_driver_location(&DriverId::new("d1"), 13.0, 77.6)
            .await
            .expect("location");
        client.start_trip(&RideId::new("r-late")).await.expect("start");

        assert!(client.rides().is_empty());
        assert!(client.drivers().is_empty());
        assert_eq!(
            (client.rides().version(), client.drivers().version()),
            versions
        );
        assert!(client.notifications().is_empty());
        server.await.expect("server");
    }

    #[tokio::test]
    async fn test_failure_after_shutdown_is_not_notified() {
        let (base, server) = serve(vec![(500, r#"{"detail":"late"}"#.to_string())]).await;
        let client = client_with(&base, &MockConnector::new());
        client.shutdown().await;

        let err = client.cancel_ride(&RideId::new("r1")).await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert!(client.notifications().is_empty());
        server.await.expect("server");
    }

    #[tokio::test]
    async fn test_refresh_after_shutdown_is_discarded() {
        let client = offline_client();
        client.shutdown().await;

        assert!(!client.refresh().await);
        assert!(client.rides().is_empty());
    }
}
