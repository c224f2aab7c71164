//! Render checkout widget options.
//!
//! Useful for checking what the payment widget will be opened with for a
//! given product, using the same configuration the app loads.
//!
//! # Usage
//!
//! ```bash
//! RAZORPAY_KEY_ID=rzp_test_xxx bazaar-cli checkout-options --name "Basmati Rice" --price 40
//! ```

use bazaar_core::ProductId;
use bazaar_marketplace::config::MarketplaceConfig;
use bazaar_marketplace::payment::{Prefill, RazorpayOptions};
use bazaar_marketplace::routes::{CheckoutParams, Route};
use bazaar_marketplace::services::checkout::CheckoutIntent;

use super::CommandError;

/// Print the Razorpay options for a buy-now checkout.
///
/// # Errors
///
/// Returns an error if the price is invalid or `RAZORPAY_KEY_ID` is not set.
pub fn options(name: &str, price: &str, product_id: Option<String>) -> Result<(), CommandError> {
    let config = MarketplaceConfig::from_env()?;
    let params = CheckoutParams {
        product_id: product_id.map(ProductId::new),
        name: Some(name.to_owned()),
        price: Some(price.to_owned()),
    };

    let options = render(&config, &params)?;
    tracing::info!("Checkout page: {}", Route::Checkout(params));
    tracing::info!("{}", serde_json::to_string_pretty(&options)?);
    Ok(())
}

fn render(config: &MarketplaceConfig, params: &CheckoutParams) -> Result<RazorpayOptions, CommandError> {
    let request = CheckoutIntent::from_params(params)?.to_request(Prefill::default())?;
    Ok(RazorpayOptions::new(&config.checkout, &request)?)
}
