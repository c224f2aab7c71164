//! Signup error types.

use thiserror::Error;

use bazaar_core::UserId;

use super::SignupStep;
use crate::auth::AuthError;
use crate::db::RepositoryError;
use crate::validation::ValidationError;
use crate::verification::VerificationError;

/// Errors that can occur while moving through the signup workflow.
#[derive(Debug, Error)]
pub enum SignupError {
    /// A field failed local validation; the step is unchanged.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The verification provider refused; the step is unchanged.
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// The auth provider refused; the step is unchanged.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The identity exists but its user record could not be written.
    #[error("Your account was created but your profile could not be saved: {source}")]
    RecordWrite {
        uid: UserId,
        #[source]
        source: RepositoryError,
    },

    /// The action does not apply to the current step.
    #[error("cannot {action} while {step}")]
    WrongStep {
        action: &'static str,
        step: SignupStep,
    },
}
