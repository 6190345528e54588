//! Builder pattern for sync client configuration.
//!
//! # Example
//!
//! ```no_run
//! use rideflux_sync::SyncClient;
//!
//! # fn example() -> rideflux_sync::Result<()> {
//! let client = SyncClient::builder()
//!     .origin("https://dispatch.example.com")
//!     .auth_token("secret")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::sync::SnapshotSource;
use crate::transport::{Connector, ReconnectPolicy};

use super::config::ClientConfig;
use super::core::SyncClient;

// ============================================================================
// SyncClientBuilder
// ============================================================================

/// Builder for configuring a [`SyncClient`].
///
/// Use [`SyncClient::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct SyncClientBuilder {
    /// Starting configuration, replaced field by field by the setters.
    config: Option<ClientConfig>,
    /// Page origin.
    origin: Option<String>,
    /// HTTP API root.
    api_base_url: Option<String>,
    /// Bearer token.
    auth_token: Option<String>,
    /// Push channel timing.
    policy: Option<ReconnectPolicy>,
    /// Notification lifetime.
    notification_ttl: Option<Duration>,
    /// Push channel connector.
    connector: Option<Arc<dyn Connector>>,
    /// Snapshot source; defaults to the HTTP client.
    snapshot_source: Option<Arc<dyn SnapshotSource>>,
    /// Preconfigured reqwest client.
    http_client: Option<reqwest::Client>,
}

// ============================================================================
// SyncClientBuilder Implementation
// ============================================================================

impl SyncClientBuilder {
    /// Creates a builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a resolved configuration (e.g. [`ClientConfig::from_env`]).
    #[inline]
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the page origin (`http://…` or `https://…`).
    #[inline]
    #[must_use]
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Overrides the HTTP API root (default `<origin>/api`).
    #[inline]
    #[must_use]
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Sets the bearer token for the HTTP API.
    #[inline]
    #[must_use]
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Sets the reconnect and heartbeat timing.
    #[inline]
    #[must_use]
    pub fn reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Sets the notification lifetime.
    #[inline]
    #[must_use]
    pub fn notification_ttl(mut self, ttl: Duration) -> Self {
        self.notification_ttl = Some(ttl);
        self
    }

    /// Replaces the push channel connector (default: WebSocket).
    #[inline]
    #[must_use]
    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Replaces the snapshot source (default: the HTTP client).
    #[inline]
    #[must_use]
    pub fn snapshot_source(mut self, source: Arc<dyn SnapshotSource>) -> Self {
        self.snapshot_source = Some(source);
        self
    }

    /// Uses a preconfigured reqwest client for the HTTP API.
    #[inline]
    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the client with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no origin is set or a value is out of range
    /// - [`Error::Url`] if a URL does not parse
    pub fn build(self) -> Result<SyncClient> {
        let config = self.resolve_config()?;
        Self::validate_policy(&config.policy)?;
        Self::validate_ttl(config.notification_ttl)?;

        SyncClient::new(config, self.connector, self.snapshot_source, self.http_client)
    }
}

// ============================================================================
// Validation
// ============================================================================

impl SyncClientBuilder {
    /// Merges the explicit setters over the starting configuration.
    fn resolve_config(&self) -> Result<ClientConfig> {
        let mut config = match (&self.origin, &self.config) {
            (Some(origin), _) => ClientConfig::new(Url::parse(origin)?)?,
            (None, Some(config)) => config.clone(),
            (None, None) => {
                return Err(Error::config(
                    "Origin is required. Use .origin() or .config() to set it.\n\
                     Example: SyncClient::builder().origin(\"https://dispatch.example.com\")",
                ));
            }
        };

        if let (Some(_), Some(base)) = (&self.origin, &self.config) {
            config.auth_token = base.auth_token.clone();
            config.policy = base.policy.clone();
            config.notification_ttl = base.notification_ttl;
        }

        if let Some(url) = &self.api_base_url {
            config.api_base_url = Url::parse(url)?;
        }
        if let Some(token) = &self.auth_token {
            config.auth_token = Some(token.clone());
        }
        if let Some(policy) = &self.policy {
            config.policy = policy.clone();
        }
        if let Some(ttl) = self.notification_ttl {
            config.notification_ttl = ttl;
        }

        Ok(config)
    }

    fn validate_policy(policy: &ReconnectPolicy) -> Result<()> {
        if policy.initial_delay.is_zero() {
            return Err(Error::config("Reconnect initial delay must be positive"));
        }
        if policy.max_delay < policy.initial_delay {
            return Err(Error::config(format!(
                "Reconnect max delay ({:?}) is below the initial delay ({:?})",
                policy.max_delay, policy.initial_delay
            )));
        }
        if policy.heartbeat_interval.is_zero() {
            return Err(Error::config("Heartbeat interval must be positive"));
        }
        Ok(())
    }

    fn validate_ttl(ttl: Duration) -> Result<()> {
        if ttl.is_zero() {
            return Err(Error::config("Notification TTL must be positive"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for SyncClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncClientBuilder")
            .field("origin", &self.origin)
            .field("api_base_url", &self.api_base_url)
            .field("policy", &self.policy)
            .field("custom_connector", &self.connector.is_some())
            .field("custom_snapshot_source", &self.snapshot_source.is_some())
            .field("custom_http_client", &self.http_client.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
