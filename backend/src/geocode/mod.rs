//! Outbound client for the Google geocoding API.
//!
//! Only the first match's coordinates and formatted address are returned;
//! every other provider field is discarded.
//!
//! ## Configuration
//!
//! - `GOOGLE_MAPS_API_KEY`: provider credential (required at call time)
//! - `GEOCODE_ENDPOINT`: provider URL (default: Google's JSON endpoint)
//! - `GEOCODE_TIMEOUT_SEC`: whole-request timeout in seconds (default: 10)

use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::GeocodeResult;

pub const DEFAULT_GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";
pub const DEFAULT_GEOCODE_TIMEOUT_SEC: u64 = 10;

/// Errors raised by [`GeocodeClient::geocode`].
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// The provider credential is not configured.
    #[error("GOOGLE_MAPS_API_KEY not set")]
    MissingApiKey,

    /// The caller supplied an empty address.
    #[error("address must not be empty")]
    EmptyAddress,

    /// The provider answered with a non-OK status or no results.
    #[error("Geocode failed: {status}")]
    Failed { status: String },

    /// The provider could not be reached or returned an unreadable body.
    #[error("Geocoding provider unavailable: {message}")]
    Upstream { message: String },
}

impl GeocodeError {
    fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }
}

/// Geocoding client settings.
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_GEOCODE_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_GEOCODE_TIMEOUT_SEC),
        }
    }
}

impl GeocodeConfig {
    /// Load configuration from environment variables.
    ///
    /// A missing API key is not an error here; it is reported per request.
    pub fn from_env() -> Result<Self, String> {
        let api_key = std::env::var("GOOGLE_MAPS_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let endpoint = std::env::var("GEOCODE_ENDPOINT")
            .ok()
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_GEOCODE_ENDPOINT.to_string());

        let timeout_sec = match std::env::var("GEOCODE_TIMEOUT_SEC") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|_| format!("Invalid GEOCODE_TIMEOUT_SEC: {}", v))?,
            Err(_) => DEFAULT_GEOCODE_TIMEOUT_SEC,
        };

        Ok(Self {
            api_key,
            endpoint,
            timeout: Duration::from_secs(timeout_sec),
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    results: Vec<ProviderResult>,
}

#[derive(Debug, Deserialize)]
struct ProviderResult {
    geometry: ProviderGeometry,
    #[serde(default)]
    formatted_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderGeometry {
    location: ProviderLocation,
}

#[derive(Debug, Deserialize)]
struct ProviderLocation {
    lat: f64,
    lng: f64,
}

/// Reduce a decoded provider payload to the first match.
fn first_match(response: ProviderResponse) -> Result<GeocodeResult, GeocodeError> {
    let status = response.status.unwrap_or_else(|| "UNKNOWN".to_string());
    if status != "OK" {
        return Err(GeocodeError::Failed { status });
    }

    let first = response
        .results
        .into_iter()
        .next()
        .ok_or(GeocodeError::Failed { status })?;

    Ok(GeocodeResult {
        lat: first.geometry.location.lat,
        lng: first.geometry.location.lng,
        formatted_address: first.formatted_address,
    })
}

/// Async HTTP client for the geocoding provider.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    http: reqwest::Client,
    config: GeocodeConfig,
}

impl GeocodeClient {
    pub fn new(config: GeocodeConfig) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GeocodeError::upstream(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self, String> {
        let config = GeocodeConfig::from_env()?;
        Self::new(config).map_err(|e| e.to_string())
    }

    pub fn config(&self) -> &GeocodeConfig {
        &self.config
    }

    /// Resolve `address` to the provider's top match.
    pub async fn geocode(&self, address: &str) -> Result<GeocodeResult, GeocodeError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeocodeError::EmptyAddress);
        }
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GeocodeError::MissingApiKey)?;

        let response = self
            .http
            .get(&self.config.endpoint)
            .query(&[("address", address), ("key", api_key)])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Geocoding request failed");
                GeocodeError::upstream(e.to_string())
            })?;

        let http_status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!(error = %e, "Failed to read geocoding response");
            GeocodeError::upstream(e.to_string())
        })?;

        let decoded: ProviderResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(http_status = %http_status, error = %e, "Undecodable geocoding response");
            GeocodeError::upstream(format!("HTTP {}: {}", http_status, e))
        })?;

        let result = first_match(decoded);
        match &result {
            Ok(hit) => debug!(lat = hit.lat, lng = hit.lng, "Geocoded address"),
            Err(e) => warn!(error = %e, "Geocoding rejected address"),
        }
        result
    }
}
