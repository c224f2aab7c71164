//! Saved delivery addresses.
//!
//! Each user keeps at most [`MAX_ADDRESSES`] addresses. City and state can be
//! filled from the pincode, and most fields from the device location. Both
//! fills are best effort: on failure the form is left as typed.

use thiserror::Error;
use tracing::{info, instrument, warn};

use bazaar_core::{AddressId, Pincode};

use crate::auth::Session;
use crate::db::{AddressRepository, RepositoryError};
use crate::lookup::{
    GeocodedAddress, LocationProvider, LookupError, PermissionError, PostalDetails, PostalLookup,
    ReverseGeocoder,
};
use crate::models::{Address, AddressDetails};
use crate::store::DocumentStore;
use crate::validation::{MAX_ADDRESSES, ValidationError, require};

#[derive(Debug, Error)]
pub enum AddressError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Address not found: {0}")]
    NotFound(AddressId),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Unable to fetch location. Please allow location access.")]
    Permission(#[from] PermissionError),
}

/// The signed-in user's address book.
pub struct AddressBook<'a, S> {
    repository: AddressRepository<'a, S>,
}

impl<'a, S: DocumentStore> AddressBook<'a, S> {
    #[must_use]
    pub fn new(store: &'a S, session: &Session) -> Self {
        Self {
            repository: AddressRepository::new(store, &session.uid),
        }
    }

    /// # Errors
    ///
    /// Returns `AddressError::Repository` if the read fails.
    pub async fn list(&self) -> Result<Vec<Address>, AddressError> {
        Ok(self.repository.list().await?)
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::AddressLimit` when the book is full and
    /// `ValidationError::MissingField` for a blank required field.
    #[instrument(skip_all)]
    pub async fn add(&self, details: AddressDetails) -> Result<Address, AddressError> {
        validate(&details)?;
        let saved = self.repository.list().await?.len();
        if saved >= MAX_ADDRESSES {
            return Err(ValidationError::AddressLimit { max: MAX_ADDRESSES }.into());
        }
        let address = self.repository.create(details).await?;
        info!(address_id = %address.id, "Address added");
        Ok(address)
    }

    /// Replace a saved address. Editing does not count against the limit.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::NotFound` if the address was removed.
    #[instrument(skip(self, details))]
    pub async fn update(&self, id: &AddressId, details: &AddressDetails) -> Result<(), AddressError> {
        validate(details)?;
        self.repository
            .update(id, details)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AddressError::NotFound(id.clone()),
                other => AddressError::Repository(other),
            })?;
        info!("Address updated");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AddressError::Repository` if the delete is rejected.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &AddressId) -> Result<(), AddressError> {
        self.repository.delete(id).await?;
        info!("Address deleted");
        Ok(())
    }
}

fn validate(details: &AddressDetails) -> Result<(), ValidationError> {
    require("Full name", &details.full_name)?;
    require("Mobile number", &details.mobile)?;
    require("Pincode", &details.pincode)?;
    require("Flat, house no.", &details.flat)?;
    require("Street", &details.street)?;
    require("City", &details.city)?;
    require("State", &details.state)?;
    Ok(())
}

/// Record a pincode edit and, once six characters are typed, fill city and
/// state from the postal lookup.
///
/// Returns `Ok(None)` while the pincode is still being typed.
///
/// # Errors
///
/// Returns `AddressError::Validation` for a malformed six-character pincode
/// and `AddressError::Lookup` if the lookup fails. The form keeps what was
/// typed either way.
pub async fn fill_from_pincode<P: PostalLookup>(
    form: &mut AddressDetails,
    pincode: &str,
    postal: &P,
) -> Result<Option<PostalDetails>, AddressError> {
    pincode.clone_into(&mut form.pincode);
    if !Pincode::is_complete_input(pincode) {
        return Ok(None);
    }

    let pincode = Pincode::parse(pincode).map_err(ValidationError::from)?;
    let details = postal.lookup(&pincode).await.inspect_err(|e| {
        warn!(pincode = %pincode, error = %e, "Pincode lookup failed");
    })?;

    form.city.clone_from(&details.district);
    form.state.clone_from(&details.state);
    Ok(Some(details))
}

/// Fill the form from the device's current position.
///
/// Fields the geocoder does not return keep their current value.
///
/// # Errors
///
/// Returns `AddressError::Permission` if the position cannot be read and
/// `AddressError::Lookup` if reverse geocoding fails.
#[instrument(skip_all)]
pub async fn fill_from_current_location<L, G>(
    form: &mut AddressDetails,
    location: &L,
    geocoder: &G,
) -> Result<GeocodedAddress, AddressError>
where
    L: LocationProvider,
    G: ReverseGeocoder,
{
    let coordinates = location.current_position().await.inspect_err(|e| {
        warn!(error = %e, "Current location unavailable");
    })?;
    let found = geocoder.reverse(coordinates).await.inspect_err(|e| {
        warn!(error = %e, "Reverse geocoding failed");
    })?;

    let fields = [
        (&found.house_number, &mut form.flat),
        (&found.street, &mut form.street),
        (&found.city, &mut form.city),
        (&found.state, &mut form.state),
        (&found.postcode, &mut form.pincode),
    ];
    for (value, field) in fields {
        if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            value.clone_into(field);
        }
    }
    Ok(found)
}
