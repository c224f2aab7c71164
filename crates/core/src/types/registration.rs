//! Business registration numbers required of marketplace suppliers.
//!
//! - GSTIN: Goods and Services Tax identification number (15 characters)
//! - FSSAI: food business license number (14 digits)

use std::sync::LazyLock;

use core::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// 2 digits (state), 5 letters + 4 digits + 1 letter (PAN), 1 entity code
/// (never `0`), literal `Z`, 1 checksum character.
static GSTIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$").expect("Invalid regex")
});

static FSSAI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{14}$").expect("Invalid regex"));

/// Returns `true` if `gstin` matches the GSTIN format exactly.
///
/// Letters must be uppercase; no surrounding whitespace is tolerated.
///
/// ```
/// use bazaar_core::is_valid_gstin;
///
/// assert!(is_valid_gstin("27AAPFU0939F1ZV"));
/// assert!(!is_valid_gstin("invalid"));
/// ```
#[must_use]
pub fn is_valid_gstin(gstin: &str) -> bool {
    GSTIN_RE.is_match(gstin)
}

/// Returns `true` if `fssai` is exactly 14 ASCII digits.
#[must_use]
pub fn is_valid_fssai(fssai: &str) -> bool {
    FSSAI_RE.is_match(fssai)
}

/// Errors produced when a registration number fails format validation.
///
/// The messages are shown inline next to the offending field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("Invalid GSTIN")]
    InvalidGstin,
    #[error("Invalid FSSAI Number")]
    InvalidFssai,
}

/// A format-validated GSTIN.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Gstin(String);

impl Gstin {
    /// Validate and wrap a GSTIN.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationError::InvalidGstin` if the format check fails.
    pub fn parse(s: &str) -> Result<Self, RegistrationError> {
        if is_valid_gstin(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(RegistrationError::InvalidGstin)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two-digit state code prefix.
    #[must_use]
    pub fn state_code(&self) -> &str {
        self.0.get(..2).unwrap_or_default()
    }
}

impl fmt::Display for Gstin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A format-validated FSSAI license number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Fssai(String);

impl Fssai {
    /// Validate and wrap an FSSAI number.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationError::InvalidFssai` if the input is not exactly
    /// 14 digits.
    pub fn parse(s: &str) -> Result<Self, RegistrationError> {
        if is_valid_fssai(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(RegistrationError::InvalidFssai)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fssai {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const VALID_GSTIN: &str = "27AAPFU0939F1ZV";

    #[test]
    fn test_gstin_accepts_known_good() {
        assert!(is_valid_gstin(VALID_GSTIN));
        assert!(is_valid_gstin("07AAACH7409R1ZZ"));
        assert!(is_valid_gstin("29ABCDE1234FAZ0"));
    }

    #[test]
    fn test_gstin_rejects_wrong_length() {
        assert!(!is_valid_gstin(""));
        assert!(!is_valid_gstin("invalid"));
        assert!(!is_valid_gstin(&VALID_GSTIN[..14]));
        assert!(!is_valid_gstin(&format!("{VALID_GSTIN}A")));
    }

    #[test]
    fn test_gstin_rejects_wrong_class_at_every_position() {
        // A replacement that is outside the allowed class at each position.
        let bad_for_position = [
            'A', 'A', // digits
            '1', '1', '1', '1', '1', // letters
            'A', 'A', 'A', 'A', // digits
            '1', // letter
            '0', // 1-9 or letter, never zero
            'Y', // literal Z
            'a', // digit or uppercase letter
        ];
        for (i, bad) in bad_for_position.iter().enumerate() {
            let mut chars: Vec<char> = VALID_GSTIN.chars().collect();
            chars[i] = *bad;
            let candidate: String = chars.into_iter().collect();
            assert!(
                !is_valid_gstin(&candidate),
                "expected {candidate} to be rejected (position {i})"
            );
        }
    }

    #[test]
    fn test_gstin_entity_code_is_never_zero() {
        assert!(!is_valid_gstin("27AAPFU0939F0ZV"));
        assert!(is_valid_gstin("27AAPFU0939F9ZV"));
        assert!(is_valid_gstin("27AAPFU0939FKZV"));
    }

    #[test]
    fn test_gstin_is_case_sensitive() {
        assert!(!is_valid_gstin(&VALID_GSTIN.to_lowercase()));
    }

    #[test]
    fn test_gstin_rejects_surrounding_whitespace() {
        assert!(!is_valid_gstin(&format!(" {VALID_GSTIN}")));
        assert!(!is_valid_gstin(&format!("{VALID_GSTIN}\n")));
    }

    #[test]
    fn test_gstin_state_code() {
        let gstin = Gstin::parse(VALID_GSTIN).unwrap();
        assert_eq!(gstin.state_code(), "27");
    }

    #[test]
    fn test_fssai() {
        assert!(is_valid_fssai("12345678901234"));
        assert!(!is_valid_fssai("1234567890123"));
        assert!(!is_valid_fssai("123456789012345"));
        assert!(!is_valid_fssai("1234567890123a"));
        assert!(!is_valid_fssai("１２３４５６７８９０１２３４"));
        assert_eq!(Fssai::parse("abc"), Err(RegistrationError::InvalidFssai));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(RegistrationError::InvalidGstin.to_string(), "Invalid GSTIN");
        assert_eq!(
            RegistrationError::InvalidFssai.to_string(),
            "Invalid FSSAI Number"
        );
    }
}
