//! Google Maps geocoding provider

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::Geocoder;
use crate::document::GeoPoint;
use crate::error::{Error, Result};

pub struct GoogleGeocoder {
    client: Client,
    endpoint: Url,
    api_key: String,
}

#[derive(Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl GoogleGeocoder {
    pub fn new(endpoint: &str, api_key: &str, timeout_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: Url::parse(endpoint)?,
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeoPoint> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("address", address)
            .append_pair("key", &self.api_key);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::GeocodeFailure(format!("request for '{}' failed: {}", address, e)))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(Error::GeocodeFailure(format!(
                "geocoder returned {} for '{}'",
                response.status(),
                address
            )));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| Error::GeocodeFailure(format!("unreadable response for '{}': {}", address, e)))?;

        if body.status != "OK" {
            let detail = body.error_message.unwrap_or_default();
            return Err(Error::GeocodeFailure(format!(
                "geocoder status {} for '{}' {}",
                body.status, address, detail
            )));
        }

        let location = body
            .results
            .into_iter()
            .next()
            .map(|r| r.geometry.location)
            .ok_or_else(|| Error::GeocodeFailure(format!("no results for '{}'", address)))?;

        tracing::debug!(address, lat = location.lat, lon = location.lng, "Geocoded address");
        GeoPoint::new(location.lat, location.lng)
            .map_err(|e| Error::GeocodeFailure(format!("bad coordinates for '{}': {}", address, e)))
    }

    fn provider_name(&self) -> &str {
        "google"
    }
}
