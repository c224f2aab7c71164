//! Razorpay checkout widget options.

use secrecy::ExposeSecret;
use serde::Serialize;

use super::{CheckoutRequest, Prefill};
use crate::config::{CheckoutConfig, ConfigError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RazorpayTheme {
    pub color: String,
}

/// The options object passed to the Razorpay checkout constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RazorpayOptions {
    pub key: String,
    /// Amount in paise.
    pub amount: i64,
    pub currency: String,
    pub name: String,
    pub description: String,
    pub prefill: Prefill,
    pub theme: RazorpayTheme,
}

impl RazorpayOptions {
    /// Build widget options for a checkout request.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no key id is configured.
    pub fn new(config: &CheckoutConfig, request: &CheckoutRequest) -> Result<Self, ConfigError> {
        Ok(Self {
            key: config.require_key_id()?.expose_secret().to_owned(),
            amount: request.amount_minor_units,
            currency: request.currency.clone(),
            name: config.merchant_name.clone(),
            description: request.description.clone(),
            prefill: request.prefill.clone(),
            theme: RazorpayTheme {
                color: config.theme_color.clone(),
            },
        })
    }
}
