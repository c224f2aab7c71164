//! In-process verification provider.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use rand::Rng;
use tracing::{debug, info};

use bazaar_core::PhoneNumber;

use super::{Challenge, VerificationError, VerificationProvider};

/// Generate a 6-digit verification code.
#[must_use]
pub fn generate_verification_code() -> String {
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

struct Pending {
    phone: PhoneNumber,
    code: String,
}

#[derive(Default)]
struct Inner {
    pending: HashMap<String, Pending>,
    sent: Vec<(PhoneNumber, String)>,
    fixed_code: Option<String>,
    rejected: HashSet<PhoneNumber>,
    next_id: u64,
}

/// Verification provider that records codes instead of sending SMS.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryVerifier {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryVerifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue `code` for every request instead of a random one.
    #[must_use]
    pub fn with_fixed_code(code: impl Into<String>) -> Self {
        let verifier = Self::default();
        if let Ok(mut inner) = verifier.inner.lock() {
            inner.fixed_code = Some(code.into());
        }
        verifier
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, VerificationError> {
        self.inner
            .lock()
            .map_err(|_| VerificationError::Provider("Lock poisoned".to_string()))
    }

    /// Refuse to send codes to `phone`.
    pub fn reject(&self, phone: PhoneNumber) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.rejected.insert(phone);
        }
    }

    /// Every code sent so far, oldest first.
    #[must_use]
    pub fn sent_codes(&self) -> Vec<(PhoneNumber, String)> {
        self.inner
            .lock()
            .map(|inner| inner.sent.clone())
            .unwrap_or_default()
    }

    /// The most recent code sent to `phone`.
    #[must_use]
    pub fn last_code_for(&self, phone: &PhoneNumber) -> Option<String> {
        self.inner.lock().ok().and_then(|inner| {
            inner
                .sent
                .iter()
                .rev()
                .find(|(p, _)| p == phone)
                .map(|(_, code)| code.clone())
        })
    }

    /// Challenges issued but not yet confirmed.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.lock().map_or(0, |inner| inner.pending.len())
    }
}

impl VerificationProvider for MemoryVerifier {
    async fn request_code(&self, phone: &PhoneNumber) -> Result<Challenge, VerificationError> {
        let mut inner = self.lock()?;
        if inner.rejected.contains(phone) {
            return Err(VerificationError::TooManyRequests);
        }

        let code = inner
            .fixed_code
            .clone()
            .unwrap_or_else(generate_verification_code);
        inner.next_id += 1;
        let verification_id = format!("vrf-{}", inner.next_id);

        inner.pending.insert(
            verification_id.clone(),
            Pending {
                phone: phone.clone(),
                code: code.clone(),
            },
        );
        inner.sent.push((phone.clone(), code));
        info!(phone = %phone, "Verification code sent");

        Ok(Challenge {
            phone: phone.clone(),
            verification_id,
        })
    }

    async fn confirm(&self, challenge: &Challenge, code: &str) -> Result<(), VerificationError> {
        let mut inner = self.lock()?;
        let pending = inner
            .pending
            .get(&challenge.verification_id)
            .ok_or(VerificationError::SessionExpired)?;

        if pending.phone != challenge.phone || pending.code != code.trim() {
            return Err(VerificationError::InvalidCode);
        }

        inner.pending.remove(&challenge.verification_id);
        Ok(())
    }

    async fn invalidate(&self, challenge: &Challenge) -> Result<(), VerificationError> {
        if self
            .lock()?
            .pending
            .remove(&challenge.verification_id)
            .is_some()
        {
            debug!(verification_id = %challenge.verification_id, "Challenge invalidated");
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn phone() -> PhoneNumber {
        PhoneNumber::from_local("9876543210").unwrap()
    }

    #[test]
    fn test_generate_verification_code() {
        let code = generate_verification_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn test_confirm_consumes_challenge() {
        let verifier = MemoryVerifier::new();
        let challenge = verifier.request_code(&phone()).await.unwrap();
        let code = verifier.last_code_for(&phone()).unwrap();
        assert_eq!(verifier.pending_count(), 1);

        verifier.confirm(&challenge, &code).await.unwrap();
        assert_eq!(verifier.pending_count(), 0);
        assert_eq!(
            verifier.confirm(&challenge, &code).await,
            Err(VerificationError::SessionExpired)
        );
    }

    #[tokio::test]
    async fn test_wrong_code_keeps_challenge() {
        let verifier = MemoryVerifier::with_fixed_code("123456");
        let challenge = verifier.request_code(&phone()).await.unwrap();

        assert_eq!(
            verifier.confirm(&challenge, "000000").await,
            Err(VerificationError::InvalidCode)
        );
        verifier.confirm(&challenge, "123456").await.unwrap();
    }

    #[tokio::test]
    async fn test_invalidated_challenge_cannot_be_confirmed() {
        let verifier = MemoryVerifier::with_fixed_code("123456");
        let challenge = verifier.request_code(&phone()).await.unwrap();

        verifier.invalidate(&challenge).await.unwrap();
        assert_eq!(verifier.pending_count(), 0);
        assert_eq!(
            verifier.confirm(&challenge, "123456").await,
            Err(VerificationError::SessionExpired)
        );
        // A second invalidation is a no-op.
        verifier.invalidate(&challenge).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_phone() {
        let verifier = MemoryVerifier::new();
        verifier.reject(phone());
        assert_eq!(
            verifier.request_code(&phone()).await,
            Err(VerificationError::TooManyRequests)
        );
        assert!(verifier.sent_codes().is_empty());
    }
}
