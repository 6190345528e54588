//! Client configuration and endpoint derivation.
//!
//! # Environment
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `RIDEFLUX_ORIGIN` | Page origin, e.g. `https://dispatch.example.com` | required |
//! | `RIDEFLUX_API_BASE_URL` | HTTP API root | build-time value, else `<origin>/api` |
//! | `RIDEFLUX_AUTH_TOKEN` | Bearer token | none |
//!
//! The push channel URL is always derived from the origin; it is never
//! configured independently.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::notification::DEFAULT_NOTIFICATION_TTL;
use crate::protocol::DASHBOARD_PATH;
use crate::transport::ReconnectPolicy;

// ============================================================================
// Constants
// ============================================================================

/// Environment variable holding the page origin.
pub const ENV_ORIGIN: &str = "RIDEFLUX_ORIGIN";

/// Environment variable overriding the API base URL.
pub const ENV_API_BASE_URL: &str = "RIDEFLUX_API_BASE_URL";

/// Environment variable holding the bearer token.
pub const ENV_AUTH_TOKEN: &str = "RIDEFLUX_AUTH_TOKEN";

/// API base URL baked in at build time, if any.
const BUILD_API_BASE_URL: Option<&str> = option_env!("RIDEFLUX_API_BASE_URL");

// ============================================================================
// ClientConfig
// ============================================================================

/// Resolved configuration of a sync client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Page origin (`http` or `https`).
    pub origin: Url,
    /// Root of the HTTP API.
    pub api_base_url: Url,
    /// Bearer token for the HTTP API.
    pub auth_token: Option<String>,
    /// Push channel timing.
    pub policy: ReconnectPolicy,
    /// Notification lifetime.
    pub notification_ttl: Duration,
}

impl ClientConfig {
    /// Creates a configuration for `origin` with every other value defaulted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the origin is not `http` or `https`.
    pub fn new(origin: Url) -> Result<Self> {
        validate_origin(&origin)?;
        let api_base_url = default_api_base_url(&origin)?;

        Ok(Self {
            origin,
            api_base_url,
            auth_token: None,
            policy: ReconnectPolicy::default(),
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
        })
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] or [`Error::Url`] if a variable is missing
    /// or malformed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] or [`Error::Url`] if a variable is missing
    /// or malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let origin = lookup(ENV_ORIGIN)
            .ok_or_else(|| Error::config(format!("{ENV_ORIGIN} is not set")))?;
        let mut config = Self::new(Url::parse(origin.trim())?)?;

        if let Some(base) = lookup(ENV_API_BASE_URL).or_else(|| BUILD_API_BASE_URL.map(str::to_string)) {
            config.api_base_url = Url::parse(base.trim())?;
        }
        config.auth_token = lookup(ENV_AUTH_TOKEN);

        Ok(config)
    }

    /// Returns the push channel URL for this origin.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the origin scheme cannot be upgraded.
    pub fn push_url(&self) -> Result<Url> {
        push_url(&self.origin)
    }
}

// ============================================================================
// Derivation
// ============================================================================

/// Derives the push channel URL: `https` → `wss`, `http` → `ws`, fixed path.
///
/// # Errors
///
/// Returns [`Error::Config`] for any other scheme.
pub fn push_url(origin: &Url) -> Result<Url> {
    let scheme = match origin.scheme() {
        "https" => "wss",
        "http" => "ws",
        other => return Err(Error::config(format!("Unsupported origin scheme: {other}"))),
    };

    let mut url = origin.clone();
    url.set_scheme(scheme)
        .map_err(|()| Error::config(format!("Cannot derive push URL from {origin}")))?;
    url.set_path(DASHBOARD_PATH);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// `<origin>/api`.
fn default_api_base_url(origin: &Url) -> Result<Url> {
    Ok(origin.join("/api")?)
}

fn validate_origin(origin: &Url) -> Result<()> {
    match origin.scheme() {
        "http" | "https" if origin.host().is_some() => Ok(()),
        "http" | "https" => Err(Error::config(format!("Origin has no host: {origin}"))),
        other => Err(Error::config(format!(
            "Origin must be http or https, got {other}: {origin}"
        ))),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_push_url_upgrades_scheme() {
        let https = Url::parse("https://dispatch.example.com/dashboard?tab=rides").expect("url");
        assert_eq!(
            push_url(&https).expect("push").as_str(),
            "wss://dispatch.example.com/ws/dashboard"
        );

        let http = Url::parse("http://localhost:5173").expect("url");
        assert_eq!(
            push_url(&http).expect("push").as_str(),
            "ws://localhost:5173/ws/dashboard"
        );
    }

    #[test]
    fn test_push_url_rejects_other_schemes() {
        let origin = Url::parse("ftp://example.com").expect("url");
        assert!(matches!(push_url(&origin), Err(Error::Config { .. })));
    }

    #[test]
    fn test_default_api_base() {
        let config = ClientConfig::new(Url::parse("https://dispatch.example.com/app/").expect("url"))
            .expect("config");
        assert_eq!(config.api_base_url.as_str(), "https://dispatch.example.com/api");
        assert_eq!(config.policy, ReconnectPolicy::default());
        assert_eq!(config.notification_ttl, DEFAULT_NOTIFICATION_TTL);
    }

    #[test]
    fn test_from_lookup_reads_all_variables() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_ORIGIN, "https://dispatch.example.com"),
            (ENV_API_BASE_URL, "https://api.example.com/api"),
            (ENV_AUTH_TOKEN, "token-1"),
        ]))
        .expect("config");

        assert_eq!(config.api_base_url.as_str(), "https://api.example.com/api");
        assert_eq!(config.auth_token.as_deref(), Some("token-1"));
        assert_eq!(
            config.push_url().expect("push").as_str(),
            "wss://dispatch.example.com/ws/dashboard"
        );
    }

    #[test]
    fn test_from_lookup_requires_origin() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_AUTH_TOKEN, "x")])).unwrap_err();
        assert!(err.to_string().contains(ENV_ORIGIN));
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_ORIGIN, "http://localhost:8000"),
            (ENV_AUTH_TOKEN, "  "),
        ]))
        .expect("config");
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn test_origin_must_be_web_scheme() {
        let origin = Url::parse("ws://localhost:8000").expect("url");
        assert!(ClientConfig::new(origin).is_err());
    }
}
