//! CLI subcommands.

pub mod checkout;
pub mod lookup;
pub mod validate;

use thiserror::Error;

use bazaar_core::{PincodeError, RegistrationError};
use bazaar_marketplace::config::ConfigError;
use bazaar_marketplace::lookup::LookupError;
use bazaar_marketplace::services::checkout::CheckoutError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("Invalid pincode: {0}")]
    Pincode(#[from] PincodeError),

    #[error("Invalid coordinates: {latitude}, {longitude}")]
    Coordinates { latitude: f64, longitude: f64 },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}
