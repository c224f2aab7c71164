//! Unified error handling.
//!
//! Every flow has its own error enum. `AppError` wraps them all so a caller
//! can decide how to present a failure without matching on each one:
//! [`AppError::kind`] classifies it and [`AppError::user_message`] gives the
//! text to show inline.

use thiserror::Error;

use crate::auth::{AuthError, SessionError};
use crate::config::ConfigError;
use crate::db::RepositoryError;
use crate::lookup::{LookupError, PermissionError};
use crate::payment::PaymentError;
use crate::services::addresses::AddressError;
use crate::services::checkout::CheckoutError;
use crate::services::login::LoginError;
use crate::services::products::ProductError;
use crate::services::reviews::ReviewError;
use crate::services::signup::SignupError;
use crate::store::StoreError;
use crate::validation::ValidationError;
use crate::verification::VerificationError;

/// How a failure should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Local input problem. Nothing was sent; fix the field and resubmit.
    Validation,
    /// A collaborator refused or failed. Its message is shown verbatim and
    /// the user retries by hand.
    Provider,
    /// Postal or geocoding lookup failed. The fields stay editable.
    Lookup,
    /// Location access was refused. Fall back to manual entry.
    Permission,
}

/// Application-level error type for the marketplace.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Signup(#[from] SignupError),

    #[error(transparent)]
    Login(#[from] LoginError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Product(#[from] ProductError),

    #[error(transparent)]
    Review(#[from] ReviewError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Permission(#[from] PermissionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AppError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Signup(e) => match e {
                SignupError::Validation(_) | SignupError::WrongStep { .. } => ErrorKind::Validation,
                SignupError::Verification(_) | SignupError::Auth(_) | SignupError::RecordWrite { .. } => {
                    ErrorKind::Provider
                }
            },
            Self::Login(e) => match e {
                LoginError::Validation(_) => ErrorKind::Validation,
                LoginError::Auth(_) | LoginError::Repository(_) => ErrorKind::Provider,
            },
            Self::Product(e) => match e {
                ProductError::Validation(_) | ProductError::NotOwner | ProductError::NotSupplier => {
                    ErrorKind::Validation
                }
                ProductError::Repository(_) | ProductError::NotFound(_) => ErrorKind::Provider,
            },
            Self::Review(e) => match e {
                ReviewError::Validation(_) => ErrorKind::Validation,
                ReviewError::Repository(_) => ErrorKind::Provider,
            },
            Self::Address(e) => match e {
                AddressError::Validation(_) => ErrorKind::Validation,
                AddressError::Repository(_) | AddressError::NotFound(_) => ErrorKind::Provider,
                AddressError::Lookup(_) => ErrorKind::Lookup,
                AddressError::Permission(_) => ErrorKind::Permission,
            },
            Self::Checkout(e) => match e {
                CheckoutError::Validation(_) | CheckoutError::EmptyCart => ErrorKind::Validation,
                CheckoutError::Payment(_) | CheckoutError::Config(_) => ErrorKind::Provider,
            },
            Self::Lookup(_) => ErrorKind::Lookup,
            Self::Permission(_) => ErrorKind::Permission,
            Self::Auth(_)
            | Self::Verification(_)
            | Self::Session(_)
            | Self::Store(_)
            | Self::Repository(_)
            | Self::Payment(_)
            | Self::Config(_) => ErrorKind::Provider,
        }
    }

    /// Text to show the user.
    ///
    /// Validation and provider messages are passed through unchanged.
    /// Lookup failures get a generic prompt, since the raw transport error is
    /// not useful inline.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Lookup(e) | Self::Address(AddressError::Lookup(e)) => lookup_message(e).to_owned(),
            _ => self.to_string(),
        }
    }
}

fn lookup_message(error: &LookupError) -> &'static str {
    match error {
        LookupError::NotFound(_) => "Invalid Pincode. Please enter a valid one.",
        LookupError::Http(_) | LookupError::Api { .. } | LookupError::Parse(_) => {
            "Failed to fetch address details. Please fill them in manually."
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
