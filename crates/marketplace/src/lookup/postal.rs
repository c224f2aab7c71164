//! Postal pincode API client.
//!
//! Caches successful lookups using `moka`; failures are not cached.

use std::sync::Arc;

use moka::future::Cache;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use bazaar_core::Pincode;

use super::{LookupError, PostalDetails, PostalLookup};
use crate::config::LookupConfig;

/// One element of the API's top-level array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PostalResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    post_office: Option<Vec<PostOffice>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PostOffice {
    district: String,
    state: String,
}

/// Extract district and state from a pincode API response body.
///
/// The first post office listed is used.
///
/// # Errors
///
/// Returns `LookupError::Parse` for malformed bodies and
/// `LookupError::NotFound` when the API reports no post offices.
pub fn parse_postal_response(pincode: &Pincode, body: &str) -> Result<PostalDetails, LookupError> {
    let responses: Vec<PostalResponse> =
        serde_json::from_str(body).map_err(|e| LookupError::Parse(e.to_string()))?;

    let first = responses
        .into_iter()
        .next()
        .ok_or_else(|| LookupError::Parse("empty response".to_string()))?;

    if first.status != "Success" {
        debug!(message = ?first.message, "Pincode lookup unsuccessful");
        return Err(LookupError::NotFound(pincode.to_string()));
    }

    first
        .post_office
        .unwrap_or_default()
        .into_iter()
        .next()
        .map(|office| PostalDetails {
            district: office.district,
            state: office.state,
        })
        .ok_or_else(|| LookupError::NotFound(pincode.to_string()))
}

/// Client for the public India Post pincode API.
#[derive(Clone)]
pub struct PostalPincodeClient {
    inner: Arc<PostalPincodeClientInner>,
}

struct PostalPincodeClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<String, PostalDetails>,
}

impl PostalPincodeClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder().build()?;
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(PostalPincodeClientInner {
                client,
                base_url: config.postal_url.clone(),
                cache,
            }),
        })
    }

    fn url_for(&self, pincode: &Pincode) -> Result<Url, LookupError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| LookupError::Parse("postal lookup URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("pincode")
            .push(pincode.as_str());
        Ok(url)
    }
}

impl PostalLookup for PostalPincodeClient {
    #[instrument(skip(self), fields(pincode = %pincode))]
    async fn lookup(&self, pincode: &Pincode) -> Result<PostalDetails, LookupError> {
        if let Some(cached) = self.inner.cache.get(pincode.as_str()).await {
            debug!("Pincode cache hit");
            return Ok(cached);
        }

        let response = self.inner.client.get(self.url_for(pincode)?).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LookupError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let details = parse_postal_response(pincode, &body)?;
        self.inner
            .cache
            .insert(pincode.as_str().to_owned(), details.clone())
            .await;
        Ok(details)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::MarketplaceConfig;

    fn pin() -> Pincode {
        Pincode::parse("411001").unwrap()
    }

    #[test]
    fn test_parse_success() {
        let body = r#"[{"Message":"Number of pincode(s) found:2","Status":"Success",
            "PostOffice":[{"Name":"Pune City","District":"Pune","State":"Maharashtra"},
                          {"Name":"Camp","District":"Pune","State":"Maharashtra"}]}]"#;
        let details = parse_postal_response(&pin(), body).unwrap();
        assert_eq!(
            details,
            PostalDetails {
                district: "Pune".into(),
                state: "Maharashtra".into()
            }
        );
    }

    #[test]
    fn test_parse_error_status() {
        let body = r#"[{"Message":"No records found","Status":"Error","PostOffice":null}]"#;
        assert!(matches!(
            parse_postal_response(&pin(), body),
            Err(LookupError::NotFound(_))
        ));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_postal_response(&pin(), "<html>"),
            Err(LookupError::Parse(_))
        ));
        assert!(matches!(
            parse_postal_response(&pin(), "[]"),
            Err(LookupError::Parse(_))
        ));
    }

    #[test]
    fn test_url_for() {
        let config = MarketplaceConfig::from_vars(|_| None).unwrap();
        let client = PostalPincodeClient::new(&config.lookup).unwrap();
        assert_eq!(
            client.url_for(&pin()).unwrap().as_str(),
            "https://api.postalpincode.in/pincode/411001"
        );
    }
}
