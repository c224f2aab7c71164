//! Indian postal index numbers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Pincode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PincodeError {
    #[error("pincode must be exactly {} digits", Pincode::LENGTH)]
    InvalidLength,
    #[error("pincode may only contain digits")]
    InvalidCharacter,
}

/// A six-digit postal code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Pincode(String);

impl Pincode {
    /// Number of digits in a pincode.
    pub const LENGTH: usize = 6;

    /// Parse a pincode.
    ///
    /// # Errors
    ///
    /// Returns an error unless the input is exactly six ASCII digits.
    pub fn parse(s: &str) -> Result<Self, PincodeError> {
        if s.chars().count() != Self::LENGTH {
            return Err(PincodeError::InvalidLength);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PincodeError::InvalidCharacter);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns `true` when a partially typed field has reached full length
    /// and a lookup should be attempted.
    #[must_use]
    pub fn is_complete_input(s: &str) -> bool {
        s.chars().count() == Self::LENGTH
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
