//! Authentication collaborator.
//!
//! Identities are email/password accounts owned by a hosted auth provider.
//! The provider assigns the `uid` and keeps one free-form display attribute
//! per identity, which the marketplace uses to hold the account's role.

mod memory;
mod session;

use std::future::Future;

use secrecy::SecretString;
use thiserror::Error;

use bazaar_core::{Email, EmailError, UserId};

use crate::store::Subscription;

pub use memory::MemoryAuth;
pub use session::{Session, SessionError, fill_role_from_record, resolve_session};

/// An authenticated identity as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: UserId,
    pub email: Email,
    /// Display attribute; holds the role string once signup completes.
    pub display_name: Option<String>,
}

/// Errors reported by the auth provider.
///
/// Provider messages are surfaced to the user verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("{0}")]
    WeakPassword(String),

    #[error("The email address is already in use by another account.")]
    EmailAlreadyInUse,

    /// Wrong password or unknown email.
    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("user not found")]
    UserNotFound,

    /// Any other failure, with the provider's message.
    #[error("{0}")]
    Provider(String),
}

/// Hosted email/password authentication.
pub trait AuthProvider: Send + Sync {
    /// Create an identity and sign it in.
    fn create_identity(
        &self,
        email: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<Identity, AuthError>> + Send;

    /// Sign in an existing identity.
    fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<Identity, AuthError>> + Send;

    /// Set the identity's display attribute.
    fn set_display_attribute(
        &self,
        uid: &UserId,
        value: &str,
    ) -> impl Future<Output = Result<(), AuthError>> + Send;

    /// Sign out the current identity.
    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>> + Send;

    /// Stream of the signed-in identity, starting with the current one.
    fn identity_changes(&self) -> Subscription<Option<Identity>>;
}
