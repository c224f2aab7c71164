//! Email/password sign-in.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{info, instrument};

use crate::auth::{AuthError, AuthProvider, Session, fill_role_from_record};
use crate::db::RepositoryError;
use crate::routes::Route;
use crate::store::DocumentStore;
use crate::validation::{ValidationError, require};

#[derive(Debug, Error)]
pub enum LoginError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A signed-in session and the page to open for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub session: Session,
    pub destination: Route,
}

/// Sign in and pick the dashboard for the account's role.
///
/// # Errors
///
/// Returns `ValidationError::MissingField` for a blank email or password,
/// `LoginError::Auth` with the provider's message if sign-in fails, and
/// `LoginError::Repository` if the role fallback read fails.
#[instrument(skip(auth, store, password))]
pub async fn login<A: AuthProvider, S: DocumentStore>(
    auth: &A,
    store: &S,
    email: &str,
    password: &SecretString,
) -> Result<LoginOutcome, LoginError> {
    let email = require("Email", email)?;
    require("Password", password.expose_secret())?;

    let identity = auth.sign_in(email, password).await?;
    let mut session = Session::from_identity(&identity);

    fill_role_from_record(&mut session, store).await?;

    let destination = Route::dashboard_for(session.role);
    info!(uid = %session.uid, destination = %destination, "Signed in");
    Ok(LoginOutcome {
        session,
        destination,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::{Email, Fssai, Gstin, PhoneNumber, Role};

    use super::*;
    use crate::auth::MemoryAuth;
    use crate::db::UserRepository;
    use crate::models::UserRecord;
    use crate::store::MemoryStore;

    fn password() -> SecretString {
        SecretString::from("hunter22".to_string())
    }

    #[tokio::test]
    async fn test_vendor_lands_on_vendor_page() {
        let auth = MemoryAuth::new();
        let store = MemoryStore::new();
        let identity = auth.create_identity("v@example.com", &password()).await.unwrap();
        auth.set_display_attribute(&identity.uid, "vendor").await.unwrap();

        let outcome = login(&auth, &store, "v@example.com", &password()).await.unwrap();
        assert_eq!(outcome.session.role, Some(Role::Vendor));
        assert_eq!(outcome.destination, Route::Vendor);
    }

    #[tokio::test]
    async fn test_role_falls_back_to_record() {
        let auth = MemoryAuth::new();
        let store = MemoryStore::new();
        let identity = auth.create_identity("v@example.com", &password()).await.unwrap();
        UserRepository::new(&store)
            .create(&UserRecord {
                uid: identity.uid.clone(),
                name: "Ravi".into(),
                email: Email::parse("v@example.com").unwrap(),
                phone: PhoneNumber::from_local("9876543210").unwrap(),
                gstin: Gstin::parse("27AAPFU0939F1ZV").unwrap(),
                fssai: Fssai::parse("12345678901234").unwrap(),
                address: "1 Main Road".into(),
                city: "Pune".into(),
                state: "Maharashtra".into(),
                pincode: "411001".into(),
                role: Role::Vendor,
            })
            .await
            .unwrap();

        let outcome = login(&auth, &store, "v@example.com", &password()).await.unwrap();
        assert_eq!(outcome.destination, Route::Vendor);
    }

    #[tokio::test]
    async fn test_no_role_goes_to_supplier_dashboard() {
        let auth = MemoryAuth::new();
        let store = MemoryStore::new();
        auth.create_identity("x@example.com", &password()).await.unwrap();

        let outcome = login(&auth, &store, "x@example.com", &password()).await.unwrap();
        assert_eq!(outcome.session.role, None);
        assert_eq!(outcome.destination, Route::Supplier);
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let auth = MemoryAuth::new();
        let store = MemoryStore::new();
        auth.create_identity("x@example.com", &password()).await.unwrap();

        let err = login(
            &auth,
            &store,
            "x@example.com",
            &SecretString::from("nope-nope".to_string()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password.");
    }

    #[tokio::test]
    async fn test_blank_fields() {
        let auth = MemoryAuth::new();
        let store = MemoryStore::new();
        let err = login(&auth, &store, " ", &password()).await.unwrap_err();
        assert_eq!(err.to_string(), "Email is required");
    }
}
