//! Registered user record.

use serde::{Deserialize, Serialize};

use bazaar_core::{Email, Fssai, Gstin, PhoneNumber, Role, UserId};

/// A marketplace account, written once when signup completes.
///
/// Keyed by the auth provider's `uid`; never partially persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub uid: UserId,
    pub name: String,
    pub email: Email,
    /// E.164 form, `+91` followed by the local number.
    pub phone: PhoneNumber,
    pub gstin: Gstin,
    pub fssai: Fssai,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub role: Role,
}
