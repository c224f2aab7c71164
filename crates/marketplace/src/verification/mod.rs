//! Phone verification collaborator.
//!
//! An SMS provider issues a one-time code for a phone number and returns an
//! opaque challenge handle. Confirming the code against the handle proves
//! possession of the number.

mod memory;

use std::future::Future;

use thiserror::Error;

use bazaar_core::PhoneNumber;

pub use memory::{MemoryVerifier, generate_verification_code};

/// An outstanding verification challenge.
///
/// Owned by one signup workflow, which invalidates it when the
/// verification is abandoned or superseded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub phone: PhoneNumber,
    /// Opaque handle issued by the provider.
    pub verification_id: String,
}

/// Errors reported by the verification provider, surfaced verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationError {
    #[error("The verification code is invalid.")]
    InvalidCode,

    #[error("The verification session has expired. Please request a new code.")]
    SessionExpired,

    #[error("Too many requests. Please try again later.")]
    TooManyRequests,

    #[error("The phone number is invalid.")]
    InvalidPhoneNumber,

    #[error("{0}")]
    Provider(String),
}

/// SMS one-time-code provider.
pub trait VerificationProvider: Send + Sync {
    /// Send a code to `phone`.
    fn request_code(
        &self,
        phone: &PhoneNumber,
    ) -> impl Future<Output = Result<Challenge, VerificationError>> + Send;

    /// Check `code` against an outstanding challenge.
    ///
    /// A wrong code leaves the challenge usable for another attempt.
    fn confirm(
        &self,
        challenge: &Challenge,
        code: &str,
    ) -> impl Future<Output = Result<(), VerificationError>> + Send;

    /// Discard an outstanding challenge so its code can no longer be
    /// confirmed. Unknown or already consumed challenges are ignored.
    fn invalidate(
        &self,
        challenge: &Challenge,
    ) -> impl Future<Output = Result<(), VerificationError>> + Send;
}
