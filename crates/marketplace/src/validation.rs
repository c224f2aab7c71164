//! Local form validation.
//!
//! Validation failures never reach a collaborator. The caller keeps its
//! current state and shows the message inline.

use bazaar_core::{PhoneError, PincodeError, PriceError, RegistrationError};
use thiserror::Error;

/// Maximum number of saved addresses per user.
pub const MAX_ADDRESSES: usize = 3;

/// A form field failed local validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was left blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("Invalid phone number: {0}")]
    Phone(#[from] PhoneError),

    #[error("Invalid price: {0}")]
    Price(#[from] PriceError),

    #[error("Quantity must be a whole number of zero or more")]
    InvalidQuantity,

    #[error("Invalid pincode: {0}")]
    Pincode(#[from] PincodeError),

    #[error("Please enter a review.")]
    EmptyReview,

    #[error("You can only save up to {max} addresses!")]
    AddressLimit { max: usize },
}

/// Trimmed value of a required field.
///
/// # Errors
///
/// Returns `ValidationError::MissingField` if the value is blank.
pub fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed)
}

/// Parse a non-negative whole quantity.
///
/// # Errors
///
/// Returns `ValidationError::InvalidQuantity` for anything else.
pub fn parse_quantity(input: &str) -> Result<u32, ValidationError> {
    input
        .trim()
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidQuantity)
}
