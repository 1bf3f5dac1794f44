//! Address to coordinate lookup

mod google;

pub use google::GoogleGeocoder;

use async_trait::async_trait;

use crate::config::GeocodingConfig;
use crate::document::GeoPoint;
use crate::error::{Error, Result};

/// Trait for geocoding providers
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a free-form address. Fails with `GeocodeFailure` rather than
    /// returning a placeholder coordinate.
    async fn geocode(&self, address: &str) -> Result<GeoPoint>;

    fn provider_name(&self) -> &str;
}

/// Create the configured geocoder. The API key must come from the config
/// file or the environment.
pub fn create_geocoder(config: &GeocodingConfig) -> Result<Box<dyn Geocoder>> {
    let api_key = config.api_key.as_deref().ok_or_else(|| {
        Error::Config(
            "geocoding api_key is not set (use [geocoding] api_key or EVENTSEARCH_GEOCODE_API_KEY)"
                .to_string(),
        )
    })?;
    let geocoder = GoogleGeocoder::new(&config.endpoint, api_key, config.timeout_ms)?;
    Ok(Box::new(geocoder))
}
