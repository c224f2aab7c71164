//! Core types for India Bazzar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod id;
pub mod location;
pub mod pincode;
pub mod price;
pub mod registration;
pub mod role;

pub use contact::{Email, EmailError, PhoneError, PhoneNumber};
pub use id::*;
pub use location::Coordinates;
pub use pincode::{Pincode, PincodeError};
pub use price::{CURRENCY_CODE, Price, PriceError};
pub use registration::{Fssai, Gstin, RegistrationError, is_valid_fssai, is_valid_gstin};
pub use role::{Role, RoleError};
