//! Marketplace configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `BAZAAR_NAME` - Merchant name shown in the checkout widget (default: India Bazzar)
//! - `POSTAL_LOOKUP_URL` - Postal pincode API (default: <https://api.postalpincode.in>)
//! - `GEOCODER_URL` - Reverse geocoding API (default: <https://nominatim.openstreetmap.org>)
//! - `GEOCODER_USER_AGENT` - User agent sent to the geocoder (default: india-bazzar/<version>)
//! - `LOOKUP_CACHE_TTL_SECS` - Postal lookup cache lifetime (default: 300)
//! - `RAZORPAY_KEY_ID` - Checkout key id; checkout is unavailable without it
//! - `CHECKOUT_THEME_COLOR` - Checkout widget accent colour (default: #33C0F5)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_BAZAAR_NAME: &str = "India Bazzar";
const DEFAULT_POSTAL_LOOKUP_URL: &str = "https://api.postalpincode.in";
const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_CACHE_TTL_SECS: &str = "300";
const DEFAULT_THEME_COLOR: &str = "#33C0F5";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Marketplace configuration.
#[derive(Debug, Clone)]
pub struct MarketplaceConfig {
    /// Postal and geocoding lookups
    pub lookup: LookupConfig,
    /// Checkout widget settings
    pub checkout: CheckoutConfig,
}

/// Public lookup API configuration.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// Base URL of the postal pincode API
    pub postal_url: Url,
    /// Base URL of the reverse geocoder
    pub geocoder_url: Url,
    /// User agent for geocoder requests (required by its usage policy)
    pub geocoder_user_agent: String,
    /// How long successful postal lookups are cached
    pub cache_ttl: Duration,
}

/// Checkout widget configuration.
///
/// Implements `Debug` manually to redact the key.
#[derive(Clone)]
pub struct CheckoutConfig {
    /// Merchant name shown in the widget
    pub merchant_name: String,
    /// Razorpay key id
    pub key_id: Option<SecretString>,
    /// Widget accent colour, `#RRGGBB`
    pub theme_color: String,
}

impl std::fmt::Debug for CheckoutConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutConfig")
            .field("merchant_name", &self.merchant_name)
            .field("key_id", &self.key_id.as_ref().map(|_| "[REDACTED]"))
            .field("theme_color", &self.theme_color)
            .finish()
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            merchant_name: DEFAULT_BAZAAR_NAME.to_string(),
            key_id: None,
            theme_color: DEFAULT_THEME_COLOR.to_string(),
        }
    }
}

impl MarketplaceConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_vars(vars: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let lookup = LookupConfig {
            postal_url: get_url(&vars, "POSTAL_LOOKUP_URL", DEFAULT_POSTAL_LOOKUP_URL)?,
            geocoder_url: get_url(&vars, "GEOCODER_URL", DEFAULT_GEOCODER_URL)?,
            geocoder_user_agent: get_optional_env(&vars, "GEOCODER_USER_AGENT")
                .unwrap_or_else(default_user_agent),
            cache_ttl: Duration::from_secs(
                get_env_or_default(&vars, "LOOKUP_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)
                    .parse::<u64>()
                    .map_err(|e| {
                        ConfigError::InvalidEnvVar(
                            "LOOKUP_CACHE_TTL_SECS".to_string(),
                            e.to_string(),
                        )
                    })?,
            ),
        };

        let theme_color = get_env_or_default(&vars, "CHECKOUT_THEME_COLOR", DEFAULT_THEME_COLOR);
        validate_hex_color(&theme_color, "CHECKOUT_THEME_COLOR")?;

        let checkout = CheckoutConfig {
            merchant_name: get_env_or_default(&vars, "BAZAAR_NAME", DEFAULT_BAZAAR_NAME),
            key_id: get_optional_env(&vars, "RAZORPAY_KEY_ID").map(SecretString::from),
            theme_color,
        };

        Ok(Self { lookup, checkout })
    }
}

impl CheckoutConfig {
    /// The key id, or an error naming the variable that must be set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no key id is configured.
    pub fn require_key_id(&self) -> Result<&SecretString, ConfigError> {
        self.key_id
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("RAZORPAY_KEY_ID".to_string()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn default_user_agent() -> String {
    format!("india-bazzar/{}", env!("CARGO_PKG_VERSION"))
}

/// Get an optional variable, treating blank values as unset.
fn get_optional_env(vars: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    vars(key).filter(|v| !v.trim().is_empty())
}

/// Get a variable with a default value.
fn get_env_or_default(vars: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get_optional_env(vars, key).unwrap_or_else(|| default.to_string())
}

/// Get a variable as an absolute URL.
fn get_url(
    vars: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<Url, ConfigError> {
    let value = get_env_or_default(vars, key, default);
    Url::parse(&value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate a `#RRGGBB` colour.
fn validate_hex_color(value: &str, var_name: &str) -> Result<(), ConfigError> {
    let valid = value
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if !valid {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("expected a #RRGGBB colour, got {value:?}"),
        ));
    }
    Ok(())
}
