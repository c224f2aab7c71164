//! Buy-now and cart checkout.
//!
//! The payment widget runs client-side and reports a payment id on success.
//! That id is never checked with the gateway, so every outcome is returned
//! with `verified: false`.

use thiserror::Error;
use tracing::{info, instrument, warn};

use bazaar_core::{CURRENCY_CODE, Price, PriceError, ProductId};

use crate::cart::Cart;
use crate::config::{CheckoutConfig, ConfigError};
use crate::models::UserRecord;
use crate::payment::{CheckoutRequest, PaymentError, PaymentGateway, Prefill, RazorpayOptions};
use crate::routes::CheckoutParams;
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Your cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<PriceError> for CheckoutError {
    fn from(error: PriceError) -> Self {
        Self::Validation(ValidationError::Price(error))
    }
}

/// What is being paid for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutIntent {
    /// A single listing, from the checkout page's query parameters.
    BuyNow {
        product_id: Option<ProductId>,
        name: String,
        price: Price,
    },
    /// Everything in the cart.
    Cart { items: usize, total: Price },
}

impl CheckoutIntent {
    /// Buy-now intent from the `/checkout` query.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingField` if the name or price is absent
    /// and `ValidationError::Price` if the price is malformed.
    pub fn from_params(params: &CheckoutParams) -> Result<Self, CheckoutError> {
        let name = params
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(ValidationError::MissingField("Product name"))?;
        let price = params
            .price
            .as_deref()
            .ok_or(ValidationError::MissingField("Price"))?;

        Ok(Self::BuyNow {
            product_id: params.product_id.clone(),
            name: name.to_owned(),
            price: Price::parse(price)?,
        })
    }

    /// Intent covering every entry in the cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` for an empty cart.
    pub fn from_cart(cart: &Cart) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        Ok(Self::Cart {
            items: cart.len(),
            total: cart.total()?,
        })
    }

    #[must_use]
    pub const fn amount(&self) -> Price {
        match self {
            Self::BuyNow { price, .. } => *price,
            Self::Cart { total, .. } => *total,
        }
    }

    /// Widget request for this intent, with the amount in paise.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidAmount` for a zero amount and
    /// `ValidationError::Price` if the amount does not fit in paise.
    pub fn to_request(&self, prefill: Prefill) -> Result<CheckoutRequest, CheckoutError> {
        let amount_minor_units = self.amount().to_minor_units()?;
        if amount_minor_units <= 0 {
            return Err(PaymentError::InvalidAmount.into());
        }
        Ok(CheckoutRequest {
            amount_minor_units,
            currency: CURRENCY_CODE.to_owned(),
            description: self.description(),
            prefill,
        })
    }

    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::BuyNow { name, .. } => format!("Purchase of {name}"),
            Self::Cart { items: 1, .. } => "Purchase of 1 item".to_owned(),
            Self::Cart { items, .. } => format!("Purchase of {items} items"),
        }
    }
}

/// Widget prefill for a signed-up user.
#[must_use]
pub fn prefill_for(record: &UserRecord) -> Prefill {
    Prefill {
        name: record.name.clone(),
        email: record.email.to_string(),
        contact: record.phone.to_string(),
    }
}

/// Result of a completed widget checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    pub payment_id: String,
    pub amount_minor_units: i64,
    /// Always `false`: the payment id comes from the client callback only.
    pub verified: bool,
}

pub struct CheckoutService<'a, G> {
    gateway: &'a G,
    config: &'a CheckoutConfig,
}

impl<'a, G: PaymentGateway> CheckoutService<'a, G> {
    #[must_use]
    pub const fn new(gateway: &'a G, config: &'a CheckoutConfig) -> Self {
        Self { gateway, config }
    }

    /// Options object for the Razorpay widget.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no key id is configured.
    pub fn widget_options(&self, request: &CheckoutRequest) -> Result<RazorpayOptions, CheckoutError> {
        Ok(RazorpayOptions::new(self.config, request)?)
    }

    /// Open the widget for an intent and wait for the result.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Payment` if the customer cancels or the
    /// payment fails, plus anything [`CheckoutIntent::to_request`] returns.
    #[instrument(skip(self, prefill), fields(description = %intent.description()))]
    pub async fn pay(
        &self,
        intent: &CheckoutIntent,
        prefill: Prefill,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let request = intent.to_request(prefill)?;
        self.config.require_key_id()?;

        let receipt = self
            .gateway
            .open_checkout(&request)
            .await
            .inspect_err(|e| warn!(error = %e, "Checkout did not complete"))?;

        info!(
            payment_id = %receipt.payment_id,
            amount = request.amount_minor_units,
            "Payment reported by widget (unverified)"
        );
        Ok(CheckoutOutcome {
            payment_id: receipt.payment_id,
            amount_minor_units: request.amount_minor_units,
            verified: false,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;
    use secrecy::SecretString;

    use bazaar_core::UserId;

    use super::*;
    use crate::models::ProductListing;
    use crate::payment::PaymentReceipt;

    struct RecordingGateway {
        result: Result<PaymentReceipt, PaymentError>,
        requests: Mutex<Vec<CheckoutRequest>>,
    }

    impl RecordingGateway {
        fn paying(payment_id: &str) -> Self {
            Self {
                result: Ok(PaymentReceipt {
                    payment_id: payment_id.into(),
                }),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl PaymentGateway for RecordingGateway {
        async fn open_checkout(&self, request: &CheckoutRequest) -> Result<PaymentReceipt, PaymentError> {
            self.requests.lock().unwrap().push(request.clone());
            self.result.clone()
        }
    }

    fn config() -> CheckoutConfig {
        CheckoutConfig {
            key_id: Some(SecretString::from("rzp_test_123".to_string())),
            ..CheckoutConfig::default()
        }
    }

    fn params(name: Option<&str>, price: Option<&str>) -> CheckoutParams {
        CheckoutParams {
            product_id: Some(ProductId::new("p1")),
            name: name.map(Into::into),
            price: price.map(Into::into),
        }
    }

    fn listing(id: &str, price: &str) -> ProductListing {
        ProductListing {
            id: ProductId::new(id),
            name: id.into(),
            price: Price::parse(price).unwrap(),
            quantity: 1,
            description: String::new(),
            supplier_id: UserId::new("s1"),
            created_at: Utc::now(),
            location: None,
            address: None,
        }
    }

    #[test]
    fn test_buy_now_from_params() {
        let intent = CheckoutIntent::from_params(&params(Some("Tomato"), Some("40"))).unwrap();
        assert_eq!(intent.description(), "Purchase of Tomato");
        assert_eq!(intent.amount(), Price::parse("40").unwrap());
    }

    #[test]
    fn test_missing_price_is_rejected() {
        let err = CheckoutIntent::from_params(&params(Some("Tomato"), None)).unwrap_err();
        assert_eq!(err.to_string(), "Price is required");
        assert!(CheckoutIntent::from_params(&params(None, Some("40"))).is_err());
        assert!(CheckoutIntent::from_params(&params(Some("Tomato"), Some("abc"))).is_err());
    }

    #[test]
    fn test_cart_intent() {
        assert!(matches!(
            CheckoutIntent::from_cart(&Cart::new()),
            Err(CheckoutError::EmptyCart)
        ));

        let mut cart = Cart::new();
        cart.add(listing("p1", "40"));
        cart.add(listing("p1", "40"));
        cart.add(listing("p2", "12.50"));
        let intent = CheckoutIntent::from_cart(&cart).unwrap();
        assert_eq!(intent.description(), "Purchase of 3 items");
        assert_eq!(intent.amount(), Price::parse("92.5").unwrap());
    }

    #[test]
    fn test_request_in_paise() {
        let gateway = RecordingGateway::paying("pay_1");
        let config = config();
        let service = CheckoutService::new(&gateway, &config);

        let intent = CheckoutIntent::from_params(&params(Some("Rice"), Some("12.5"))).unwrap();
        let request = intent.to_request(Prefill::default()).unwrap();
        assert_eq!(request.amount_minor_units, 1250);
        assert_eq!(request.currency, "INR");

        let options = service.widget_options(&request).unwrap();
        assert_eq!(options.amount, 1250);
        assert_eq!(options.name, "India Bazzar");
    }

    #[test]
    fn test_zero_amount_is_rejected() {
        let intent = CheckoutIntent::from_params(&params(Some("Free"), Some("0"))).unwrap();
        assert!(matches!(
            intent.to_request(Prefill::default()),
            Err(CheckoutError::Payment(PaymentError::InvalidAmount))
        ));
    }

    #[tokio::test]
    async fn test_pay_is_unverified() {
        let gateway = RecordingGateway::paying("pay_abc");
        let config = config();
        let service = CheckoutService::new(&gateway, &config);
        let intent = CheckoutIntent::from_params(&params(Some("Tomato"), Some("40"))).unwrap();

        let outcome = service.pay(&intent, Prefill::default()).await.unwrap();
        assert_eq!(outcome.payment_id, "pay_abc");
        assert_eq!(outcome.amount_minor_units, 4000);
        assert!(!outcome.verified);
        assert_eq!(gateway.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_payment() {
        let gateway = RecordingGateway {
            result: Err(PaymentError::Cancelled),
            requests: Mutex::new(Vec::new()),
        };
        let config = config();
        let service = CheckoutService::new(&gateway, &config);
        let intent = CheckoutIntent::from_params(&params(Some("Tomato"), Some("40"))).unwrap();
        assert!(matches!(
            service.pay(&intent, Prefill::default()).await,
            Err(CheckoutError::Payment(PaymentError::Cancelled))
        ));
    }

    #[tokio::test]
    async fn test_pay_without_key_never_opens_widget() {
        let gateway = RecordingGateway::paying("pay_abc");
        let config = CheckoutConfig::default();
        let service = CheckoutService::new(&gateway, &config);
        let intent = CheckoutIntent::from_params(&params(Some("Tomato"), Some("40"))).unwrap();
        assert!(matches!(
            service.pay(&intent, Prefill::default()).await,
            Err(CheckoutError::Config(ConfigError::MissingEnvVar(_)))
        ));
        assert!(gateway.requests.lock().unwrap().is_empty());
    }
}
