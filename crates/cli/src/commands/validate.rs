//! Offline registration number checks.
//!
//! # Usage
//!
//! ```bash
//! bazaar-cli validate gstin 27AAPFU0939F1ZV
//! bazaar-cli validate fssai 12345678901234
//! ```

use bazaar_core::{Fssai, Gstin};

use super::CommandError;

/// Check a GSTIN and report its state code.
///
/// # Errors
///
/// Returns `CommandError::Registration` if the GSTIN is malformed.
pub fn gstin(value: &str) -> Result<(), CommandError> {
    let gstin = Gstin::parse(value)?;
    tracing::info!("Valid GSTIN: {} (state code {})", gstin, gstin.state_code());
    Ok(())
}

/// Check an FSSAI licence number.
///
/// # Errors
///
/// Returns `CommandError::Registration` if the number is malformed.
pub fn fssai(value: &str) -> Result<(), CommandError> {
    let fssai = Fssai::parse(value)?;
    tracing::info!("Valid FSSAI number: {}", fssai);
    Ok(())
}
