//! Per-step signup forms.

use secrecy::SecretString;

use bazaar_core::{Fssai, Gstin};

/// Step 1: who is signing up.
#[derive(Debug, Clone)]
pub struct BasicInfoForm {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    /// Local number as typed; `+91` is added before verification.
    pub phone: String,
}

/// Step 2: business registration numbers, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialsForm {
    pub gstin: String,
    pub fssai: String,
}

/// Step 2, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub gstin: Gstin,
    pub fssai: Fssai,
}

impl From<&Credentials> for CredentialsForm {
    fn from(credentials: &Credentials) -> Self {
        Self {
            gstin: credentials.gstin.to_string(),
            fssai: credentials.fssai.to_string(),
        }
    }
}

/// Step 4: business address.
///
/// City and state may be filled in from the pincode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressForm {
    pub address: String,
    pub pincode: String,
    pub city: String,
    pub state: String,
}
