//! Reverse geocoding client for a Nominatim-compatible API.

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use bazaar_core::Coordinates;

use super::{GeocodedAddress, LookupError, ReverseGeocoder};
use crate::config::LookupConfig;

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<ReverseAddress>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ReverseAddress {
    house_number: Option<String>,
    road: Option<String>,
    suburb: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
}

/// Extract address components from a reverse geocoding response body.
///
/// Street falls back to the suburb; city falls back to town, then village.
///
/// # Errors
///
/// Returns `LookupError::Parse` for malformed bodies and
/// `LookupError::NotFound` when the API reports an error.
pub fn parse_reverse_response(
    coordinates: Coordinates,
    body: &str,
) -> Result<GeocodedAddress, LookupError> {
    let response: ReverseResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Parse(e.to_string()))?;

    if let Some(error) = response.error {
        return Err(LookupError::NotFound(format!(
            "{},{}: {error}",
            coordinates.latitude, coordinates.longitude
        )));
    }

    let address = response.address.unwrap_or_default();
    Ok(GeocodedAddress {
        house_number: address.house_number,
        street: address.road.or(address.suburb),
        city: address.city.or(address.town).or(address.village),
        state: address.state,
        postcode: address.postcode,
    })
}

/// Reverse geocoding API client.
#[derive(Clone)]
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: Url,
}

impl NominatimClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the user agent is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.geocoder_user_agent)
                .map_err(|e| LookupError::Parse(format!("Invalid user agent: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.geocoder_url.clone(),
        })
    }

    fn url_for(&self, coordinates: Coordinates) -> Result<Url, LookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| LookupError::Parse("geocoder URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("reverse");
        url.query_pairs_mut()
            .append_pair("lat", &coordinates.latitude.to_string())
            .append_pair("lon", &coordinates.longitude.to_string())
            .append_pair("format", "json");
        Ok(url)
    }
}

impl ReverseGeocoder for NominatimClient {
    #[instrument(skip(self))]
    async fn reverse(&self, coordinates: Coordinates) -> Result<GeocodedAddress, LookupError> {
        let response = self.client.get(self.url_for(coordinates)?).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LookupError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        parse_reverse_response(coordinates, &body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::MarketplaceConfig;

    const PUNE: Coordinates = Coordinates::new(18.5204, 73.8567);

    #[test]
    fn test_parse_full_address() {
        let body = r#"{"address":{"house_number":"12","road":"MG Road","city":"Pune",
            "state":"Maharashtra","postcode":"411001","country":"India"}}"#;
        let address = parse_reverse_response(PUNE, body).unwrap();
        assert_eq!(address.house_number.as_deref(), Some("12"));
        assert_eq!(address.street.as_deref(), Some("MG Road"));
        assert_eq!(address.city.as_deref(), Some("Pune"));
        assert_eq!(address.postcode.as_deref(), Some("411001"));
    }

    #[test]
    fn test_parse_fallbacks() {
        let body = r#"{"address":{"suburb":"Camp","village":"Wagholi","state":"Maharashtra"}}"#;
        let address = parse_reverse_response(PUNE, body).unwrap();
        assert_eq!(address.street.as_deref(), Some("Camp"));
        assert_eq!(address.city.as_deref(), Some("Wagholi"));
        assert_eq!(address.house_number, None);
    }

    #[test]
    fn test_parse_error() {
        let body = r#"{"error":"Unable to geocode"}"#;
        assert!(matches!(
            parse_reverse_response(PUNE, body),
            Err(LookupError::NotFound(_))
        ));
    }

    #[test]
    fn test_url_for() {
        let config = MarketplaceConfig::from_vars(|_| None).unwrap();
        let client = NominatimClient::new(&config.lookup).unwrap();
        assert_eq!(
            client.url_for(PUNE).unwrap().as_str(),
            "https://nominatim.openstreetmap.org/reverse?lat=18.5204&lon=73.8567&format=json"
        );
    }
}
