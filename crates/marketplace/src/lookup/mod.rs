//! Address lookup collaborators.
//!
//! - [`PostalLookup`] - pincode to district/state
//! - [`ReverseGeocoder`] - coordinates to a street address
//! - [`LocationProvider`] - the device's current position
//!
//! Every failure here is non-fatal: callers log it and leave the affected
//! fields for manual entry.

mod geocode;
mod location;
mod postal;

use std::future::Future;

use thiserror::Error;

use bazaar_core::{Coordinates, Pincode};

pub use geocode::{NominatimClient, parse_reverse_response};
pub use location::{FixedLocation, LocationProvider, PermissionError};
pub use postal::{PostalPincodeClient, parse_postal_response};

/// District and state for a pincode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalDetails {
    pub district: String,
    pub state: String,
}

/// Address components for a pair of coordinates. Any may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeocodedAddress {
    pub house_number: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
}

/// Errors from the lookup APIs.
#[derive(Debug, Error)]
pub enum LookupError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The lookup ran but found nothing.
    #[error("No results for {0}")]
    NotFound(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Pincode lookup.
pub trait PostalLookup: Send + Sync {
    fn lookup(
        &self,
        pincode: &Pincode,
    ) -> impl Future<Output = Result<PostalDetails, LookupError>> + Send;
}

/// Reverse geocoding.
pub trait ReverseGeocoder: Send + Sync {
    fn reverse(
        &self,
        coordinates: Coordinates,
    ) -> impl Future<Output = Result<GeocodedAddress, LookupError>> + Send;
}
