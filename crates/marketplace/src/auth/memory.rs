//! In-process auth provider.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use futures::channel::mpsc;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use bazaar_core::{Email, UserId};

use super::{AuthError, AuthProvider, Identity};
use crate::store::{Subscription, SubscriptionHandle};

/// Minimum password length accepted by the provider.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Salt length in bytes.
const SALT_LENGTH: usize = 16;

struct Account {
    identity: Identity,
    password_hash: String,
}

#[derive(Default)]
struct Inner {
    /// Keyed by normalized email.
    accounts: HashMap<String, Account>,
    current: Option<Identity>,
    listeners: Vec<(u64, mpsc::UnboundedSender<Option<Identity>>)>,
    next_listener: u64,
    next_uid: u64,
    reject_display_updates: bool,
}

impl Inner {
    fn set_current(&mut self, identity: Option<Identity>) {
        self.current = identity;
        let current = self.current.clone();
        self.listeners
            .retain(|(_, tx)| tx.unbounded_send(current.clone()).is_ok());
    }
}

/// Auth provider held entirely in memory, with Argon2id-hashed passwords.
///
/// Cheap to clone; clones share the same accounts.
#[derive(Clone, Default)]
pub struct MemoryAuth {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryAuth {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, AuthError> {
        self.inner
            .lock()
            .map_err(|_| AuthError::Provider("Lock poisoned".to_string()))
    }

    /// Make every later `set_display_attribute` call fail.
    pub fn reject_display_updates(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.reject_display_updates = true;
        }
    }

    /// Number of registered identities.
    #[must_use]
    pub fn identity_count(&self) -> usize {
        self.inner.lock().map_or(0, |inner| inner.accounts.len())
    }

    /// Look up an identity by uid.
    #[must_use]
    pub fn identity(&self, uid: &UserId) -> Option<Identity> {
        self.inner.lock().ok().and_then(|inner| {
            inner
                .accounts
                .values()
                .find(|a| &a.identity.uid == uid)
                .map(|a| a.identity.clone())
        })
    }
}

impl AuthProvider for MemoryAuth {
    async fn create_identity(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Identity, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password.expose_secret())?;
        let password_hash = hash_password(password.expose_secret())?;

        let mut inner = self.lock()?;
        let key = email.normalized();
        if inner.accounts.contains_key(&key) {
            return Err(AuthError::EmailAlreadyInUse);
        }

        inner.next_uid += 1;
        let identity = Identity {
            uid: UserId::new(format!("uid-{}", inner.next_uid)),
            email,
            display_name: None,
        };
        inner.accounts.insert(
            key,
            Account {
                identity: identity.clone(),
                password_hash,
            },
        );
        inner.set_current(Some(identity.clone()));
        info!(uid = %identity.uid, "Identity created");
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Identity, AuthError> {
        let email = Email::parse(email)?;
        let mut inner = self.lock()?;
        let account = inner
            .accounts
            .get(&email.normalized())
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(password.expose_secret(), &account.password_hash)?;

        let identity = account.identity.clone();
        inner.set_current(Some(identity.clone()));
        Ok(identity)
    }

    async fn set_display_attribute(&self, uid: &UserId, value: &str) -> Result<(), AuthError> {
        let mut inner = self.lock()?;
        if inner.reject_display_updates {
            return Err(AuthError::Provider(
                "Profile update is temporarily unavailable.".to_string(),
            ));
        }
        let account = inner
            .accounts
            .values_mut()
            .find(|a| &a.identity.uid == uid)
            .ok_or(AuthError::UserNotFound)?;
        account.identity.display_name = Some(value.to_owned());
        let updated = account.identity.clone();

        if inner.current.as_ref().is_some_and(|c| &c.uid == uid) {
            inner.set_current(Some(updated));
        }
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.lock()?.set_current(None);
        Ok(())
    }

    fn identity_changes(&self) -> Subscription<Option<Identity>> {
        let (tx, rx) = mpsc::unbounded();
        let Ok(mut inner) = self.inner.lock() else {
            // The stream ends immediately; consumers see no identity.
            return Subscription::new(SubscriptionHandle::detached(), rx);
        };
        let _ = tx.unbounded_send(inner.current.clone());
        let key = inner.next_listener;
        inner.next_listener += 1;
        inner.listeners.push((key, tx));
        drop(inner);

        let weak = Arc::downgrade(&self.inner);
        let handle = SubscriptionHandle::new(move || {
            if let Some(inner) = weak.upgrade()
                && let Ok(mut inner) = inner.lock()
            {
                inner.listeners.retain(|(k, _)| *k != key);
                debug!(key, "Identity listener cancelled");
            }
        });
        Subscription::new(handle, rx)
    }
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password should be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::encode_b64(&rand::random::<[u8; SALT_LENGTH]>())
        .map_err(|_| AuthError::Provider("salt generation failed".to_string()))?;
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::Provider("password hashing failed".to_string()))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
