//! Postal and geocoding lookups against the configured APIs.
//!
//! # Usage
//!
//! ```bash
//! bazaar-cli pincode 411001
//! bazaar-cli geocode 18.5204 73.8567
//! ```
//!
//! # Environment Variables
//!
//! - `POSTAL_LOOKUP_URL` - Postal pincode API base URL
//! - `GEOCODER_URL` - Reverse geocoder base URL
//! - `GEOCODER_USER_AGENT` - User agent sent to the geocoder

use bazaar_core::{Coordinates, Pincode};
use bazaar_marketplace::config::MarketplaceConfig;
use bazaar_marketplace::lookup::{
    NominatimClient, PostalLookup, PostalPincodeClient, ReverseGeocoder,
};

use super::CommandError;

/// Resolve a pincode to its district and state.
///
/// # Errors
///
/// Returns an error if the pincode is malformed, the configuration is
/// invalid, or the lookup fails.
pub async fn pincode(value: &str) -> Result<(), CommandError> {
    let pincode = Pincode::parse(value.trim())?;
    let config = MarketplaceConfig::from_env()?;
    let client = PostalPincodeClient::new(&config.lookup)?;

    tracing::info!("Looking up pincode {}...", pincode);
    let details = client.lookup(&pincode).await?;

    tracing::info!("District: {}", details.district);
    tracing::info!("State: {}", details.state);
    Ok(())
}

/// Reverse geocode a position.
///
/// # Errors
///
/// Returns an error if the coordinates are out of range, the configuration
/// is invalid, or the lookup fails.
pub async fn geocode(latitude: f64, longitude: f64) -> Result<(), CommandError> {
    let coordinates = Coordinates::new(latitude, longitude);
    if !coordinates.is_valid() {
        return Err(CommandError::Coordinates {
            latitude,
            longitude,
        });
    }
    let config = MarketplaceConfig::from_env()?;
    let client = NominatimClient::new(&config.lookup)?;

    tracing::info!("Reverse geocoding {}, {}...", latitude, longitude);
    let address = client.reverse(coordinates).await?;

    let fields = [
        ("House number", &address.house_number),
        ("Street", &address.street),
        ("City", &address.city),
        ("State", &address.state),
        ("Postcode", &address.postcode),
    ];
    for (label, value) in fields {
        tracing::info!("{}: {}", label, value.as_deref().unwrap_or("-"));
    }
    tracing::info!("Map: {}", coordinates.maps_url());
    Ok(())
}
