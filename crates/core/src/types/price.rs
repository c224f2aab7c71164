//! Type-safe price representation using decimal arithmetic.
//!
//! All marketplace prices are in Indian rupees. The payment gateway takes
//! amounts in paise (the minor unit), so conversion lives here rather than
//! at each call site.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// ISO 4217 code of the only currency the marketplace trades in.
pub const CURRENCY_CODE: &str = "INR";

/// Minor units per rupee.
const PAISE_PER_RUPEE: i64 = 100;

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("price cannot be empty")]
    Empty,
    #[error("price must be a number")]
    NotANumber,
    #[error("price cannot be negative")]
    Negative,
    #[error("price is too large")]
    Overflow,
}

/// A non-negative rupee amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount in rupees.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` for amounts below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// Parse a price typed into a form field.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is blank, not a decimal number, or
    /// negative.
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(PriceError::Empty);
        }
        let amount = Decimal::from_str(input).map_err(|_| PriceError::NotANumber)?;
        Self::new(amount)
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Amount in paise, rounded to the nearest paisa.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the amount does not fit in an `i64`.
    pub fn to_minor_units(&self) -> Result<i64, PriceError> {
        (self.0 * Decimal::from(PAISE_PER_RUPEE))
            .round()
            .to_i64()
            .ok_or(PriceError::Overflow)
    }

    /// Sum of several prices.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the total exceeds the decimal range.
    pub fn sum<'a>(prices: impl IntoIterator<Item = &'a Self>) -> Result<Self, PriceError> {
        prices.into_iter().try_fold(Self::ZERO, |total, price| {
            total
                .0
                .checked_add(price.0)
                .map(Self)
                .ok_or(PriceError::Overflow)
        })
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{}", self.0.normalize())
    }
}
