//! Integration tests for India Bazzar.
//!
//! Every flow runs against the in-process collaborators, so no network or
//! hosted services are needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `signup` - Multi-step signup with phone verification
//! - `listing_sync` - Live vendor view, reviews and search
//! - `supplier_dashboard` - Supplier listings and session routing
//! - `address_book` - Saved addresses and lookup auto-fill
//! - `cart_checkout` - Cart and payment widget

use std::collections::HashMap;
use std::sync::Mutex;

use secrecy::SecretString;

use bazaar_core::{Coordinates, Pincode, Role};
use bazaar_marketplace::auth::MemoryAuth;
use bazaar_marketplace::lookup::{
    FixedLocation, GeocodedAddress, LookupError, PostalDetails, PostalLookup, ReverseGeocoder,
};
use bazaar_marketplace::payment::{CheckoutRequest, PaymentError, PaymentGateway, PaymentReceipt};
use bazaar_marketplace::services::signup::{
    AddressForm, BasicInfoForm, CredentialsForm, SignupWorkflow,
};
use bazaar_marketplace::store::MemoryStore;
use bazaar_marketplace::verification::MemoryVerifier;

/// Code the test verifier sends to every phone.
pub const TEST_CODE: &str = "123456";

/// Valid registration numbers.
pub const VALID_GSTIN: &str = "27AAPFU0939F1ZV";
pub const VALID_FSSAI: &str = "12345678901234";

/// Postal lookup backed by a fixed table.
#[derive(Debug, Default)]
pub struct FixedPostalLookup {
    entries: HashMap<String, PostalDetails>,
}

impl FixedPostalLookup {
    #[must_use]
    pub fn with(mut self, pincode: &str, district: &str, state: &str) -> Self {
        self.entries.insert(
            pincode.to_owned(),
            PostalDetails {
                district: district.to_owned(),
                state: state.to_owned(),
            },
        );
        self
    }
}

impl PostalLookup for FixedPostalLookup {
    async fn lookup(&self, pincode: &Pincode) -> Result<PostalDetails, LookupError> {
        self.entries
            .get(pincode.as_str())
            .cloned()
            .ok_or_else(|| LookupError::NotFound(pincode.to_string()))
    }
}

/// Reverse geocoder that returns the same address everywhere.
#[derive(Debug, Default)]
pub struct FixedGeocoder(pub GeocodedAddress);

impl ReverseGeocoder for FixedGeocoder {
    async fn reverse(&self, _coordinates: Coordinates) -> Result<GeocodedAddress, LookupError> {
        Ok(self.0.clone())
    }
}

/// Payment widget stand-in that records what it was opened with.
#[derive(Debug)]
pub struct FakeGateway {
    outcome: Result<PaymentReceipt, PaymentError>,
    opened: Mutex<Vec<CheckoutRequest>>,
}

impl FakeGateway {
    #[must_use]
    pub fn succeeding(payment_id: &str) -> Self {
        Self {
            outcome: Ok(PaymentReceipt {
                payment_id: payment_id.to_owned(),
            }),
            opened: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn failing(error: PaymentError) -> Self {
        Self {
            outcome: Err(error),
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Requests the widget was opened with.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn opened(&self) -> Vec<CheckoutRequest> {
        self.opened.lock().unwrap().clone()
    }
}

impl PaymentGateway for FakeGateway {
    #[allow(clippy::unwrap_used)]
    async fn open_checkout(&self, request: &CheckoutRequest) -> Result<PaymentReceipt, PaymentError> {
        self.opened.lock().unwrap().push(request.clone());
        self.outcome.clone()
    }
}

/// The in-process collaborators one test works against.
pub struct TestContext {
    pub store: MemoryStore,
    pub auth: MemoryAuth,
    pub verifier: MemoryVerifier,
    pub postal: FixedPostalLookup,
    pub location: FixedLocation,
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            auth: MemoryAuth::new(),
            verifier: MemoryVerifier::with_fixed_code(TEST_CODE),
            postal: FixedPostalLookup::default()
                .with("411001", "Pune", "Maharashtra")
                .with("110001", "New Delhi", "Delhi"),
            location: FixedLocation::at(Coordinates::new(18.5204, 73.8567)),
        }
    }

    #[must_use]
    pub const fn signup(
        &self,
        role: Role,
    ) -> SignupWorkflow<'_, MemoryAuth, MemoryVerifier, MemoryStore, FixedPostalLookup> {
        SignupWorkflow::new(&self.auth, &self.verifier, &self.store, &self.postal, role)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[must_use]
pub fn password() -> SecretString {
    SecretString::from("street-food-22".to_string())
}

#[must_use]
pub fn basic_info(email: &str, phone: &str) -> BasicInfoForm {
    BasicInfoForm {
        name: "Asha Patil".to_owned(),
        email: email.to_owned(),
        password: password(),
        phone: phone.to_owned(),
    }
}

#[must_use]
pub fn valid_credentials() -> CredentialsForm {
    CredentialsForm {
        gstin: VALID_GSTIN.to_owned(),
        fssai: VALID_FSSAI.to_owned(),
    }
}

#[must_use]
pub fn pune_address() -> AddressForm {
    AddressForm {
        address: "12 MG Road".to_owned(),
        pincode: "411001".to_owned(),
        city: "Pune".to_owned(),
        state: "Maharashtra".to_owned(),
    }
}
