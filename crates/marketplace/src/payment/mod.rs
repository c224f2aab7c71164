//! Payment gateway collaborator.
//!
//! Checkout happens in a client-side widget. The widget reports success with
//! a payment id; nothing verifies that id server-side, so every outcome
//! produced from it is marked unverified.

mod razorpay;

use std::future::Future;

use serde::Serialize;
use thiserror::Error;

pub use razorpay::{RazorpayOptions, RazorpayTheme};

/// Customer details pre-filled into the widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// What the widget is asked to collect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Amount in paise.
    pub amount_minor_units: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    pub description: String,
    pub prefill: Prefill,
}

/// The widget's success callback payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub payment_id: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// The customer closed the widget.
    #[error("Payment cancelled")]
    Cancelled,

    #[error("Payment failed: {reason}")]
    Failed { reason: String },

    #[error("Invalid payment amount")]
    InvalidAmount,
}

/// Client-side checkout widget.
pub trait PaymentGateway: Send + Sync {
    /// Open the widget and wait for the customer to finish.
    fn open_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> impl Future<Output = Result<PaymentReceipt, PaymentError>> + Send;
}
