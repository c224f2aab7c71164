//! Contact details: email addresses and phone numbers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Country calling code prepended to local phone numbers.
pub const DEFAULT_COUNTRY_CODE: &str = "91";

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not have the `local@domain` shape.
    #[error("email must look like name@domain")]
    Malformed,
}

/// An email address.
///
/// Validation is structural only: a non-empty local part and domain
/// separated by a single `@`. Deliverability is the auth provider's concern.
///
/// ```
/// use bazaar_core::Email;
///
/// assert!(Email::parse("vendor@bazaar.in").is_ok());
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("a@b@c").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 254 characters,
    /// or is not of the form `local@domain`.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        match s.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(s.to_owned()))
            }
            _ => Err(EmailError::Malformed),
        }
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased form used for identity comparisons.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Errors that can occur when normalizing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// No digits were supplied.
    #[error("phone number cannot be empty")]
    Empty,
    /// The number contains something other than digits and separators.
    #[error("phone number may only contain digits")]
    InvalidCharacter,
    /// The number is outside the E.164 length bounds.
    #[error("phone number must have between 8 and 15 digits")]
    InvalidLength,
}

/// A phone number in E.164 form (`+` followed by 8-15 digits).
///
/// Local numbers are given the `+91` country code.
///
/// ```
/// use bazaar_core::PhoneNumber;
///
/// let phone = PhoneNumber::from_local("98765 43210").unwrap();
/// assert_eq!(phone.as_str(), "+919876543210");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalize a user-entered number.
    ///
    /// Spaces and dashes are ignored. A leading `+` means the country code
    /// is already present; otherwise `+91` is prepended.
    ///
    /// # Errors
    ///
    /// Returns an error if the number is empty, contains non-digits, or the
    /// resulting E.164 number has the wrong length.
    pub fn from_local(input: &str) -> Result<Self, PhoneError> {
        let trimmed = input.trim();
        let (has_country_code, rest) = match trimmed.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let mut digits = String::with_capacity(rest.len());
        for c in rest.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' => {}
                _ => return Err(PhoneError::InvalidCharacter),
            }
        }
        if digits.is_empty() {
            return Err(PhoneError::Empty);
        }

        let e164 = if has_country_code {
            digits
        } else {
            format!("{DEFAULT_COUNTRY_CODE}{digits}")
        };
        if !(8..=15).contains(&e164.len()) {
            return Err(PhoneError::InvalidLength);
        }

        Ok(Self(format!("+{e164}")))
    }

    /// Returns the number in E.164 form, including the leading `+`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
