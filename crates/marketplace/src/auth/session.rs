//! Resolved session for the signed-in user.

use thiserror::Error;
use tracing::{instrument, warn};

use bazaar_core::{Email, Role, UserId};

use super::{AuthProvider, Identity};
use crate::db::{RepositoryError, UserRepository};
use crate::store::DocumentStore;

/// The signed-in user, resolved once and passed explicitly to operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub uid: UserId,
    pub email: Email,
    /// `None` for identities that never finished signup.
    pub role: Option<Role>,
}

impl Session {
    /// Session for an identity whose display attribute carries its role.
    ///
    /// An unrecognised display attribute yields no role.
    #[must_use]
    pub fn from_identity(identity: &Identity) -> Self {
        let role = identity
            .display_name
            .as_deref()
            .and_then(|name| name.parse::<Role>().ok());
        Self {
            uid: identity.uid.clone(),
            email: identity.email.clone(),
            role,
        }
    }

    #[must_use]
    pub fn is_supplier(&self) -> bool {
        self.role == Some(Role::Supplier)
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Resolve the current session.
///
/// The role comes from the identity's display attribute, falling back to the
/// stored user record when the attribute is missing (it is set after the
/// identity is created, and that update may have failed).
///
/// # Errors
///
/// Returns `SessionError::Repository` if the fallback record read fails.
#[instrument(skip_all)]
pub async fn resolve_session<A: AuthProvider, S: DocumentStore>(
    auth: &A,
    store: &S,
) -> Result<Option<Session>, SessionError> {
    let mut changes = auth.identity_changes();
    let current = changes.next().await.flatten();
    changes.cancel();

    let Some(identity) = current else {
        return Ok(None);
    };
    let mut session = Session::from_identity(&identity);
    fill_role_from_record(&mut session, store).await?;
    Ok(Some(session))
}

/// Take the role from the stored user record when the identity carries none.
///
/// # Errors
///
/// Returns `RepositoryError` if the record read fails.
pub async fn fill_role_from_record<S: DocumentStore>(
    session: &mut Session,
    store: &S,
) -> Result<(), RepositoryError> {
    if session.role.is_some() {
        return Ok(());
    }
    match UserRepository::new(store).get(&session.uid).await? {
        Some(record) => session.role = Some(record.role),
        None => warn!(uid = %session.uid, "Signed-in identity has no user record"),
    }
    Ok(())
}
