//! Page routes.
//!
//! # Route Structure
//!
//! - `/` - Home
//! - `/login` - Sign in
//! - `/supplier-signup` - Supplier signup workflow
//! - `/supplier` - Supplier dashboard (requires a session)
//! - `/supplier/profile` - Supplier listings editor (requires a session)
//! - `/vendor` - Marketplace view, cart and reviews
//! - `/checkout?productId=..&name=..&price=..` - Buy-now checkout

use std::fmt;

use thiserror::Error;
use url::Url;

use bazaar_core::{ProductId, Role};

use crate::auth::Session;
use crate::models::ProductListing;

/// Base used to parse relative paths.
const PARSE_BASE: &str = "http://localhost/";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("invalid route {0:?}: {1}")]
    Malformed(String, String),

    #[error("unknown route: {0}")]
    Unknown(String),
}

/// Query parameters of the checkout page.
///
/// Every parameter is optional in the URL; checkout decides what is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutParams {
    pub product_id: Option<ProductId>,
    pub name: Option<String>,
    pub price: Option<String>,
}

impl CheckoutParams {
    /// Buy-now parameters for a listing.
    #[must_use]
    pub fn for_listing(product: &ProductListing) -> Self {
        Self {
            product_id: Some(product.id.clone()),
            name: Some(product.name.clone()),
            price: Some(product.price.amount().normalize().to_string()),
        }
    }
}

/// A page in the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    SupplierSignup,
    Supplier,
    SupplierProfile,
    Vendor,
    Checkout(CheckoutParams),
}

impl Route {
    /// Parse a path with optional query string, e.g. `/checkout?price=40`.
    ///
    /// A trailing slash is ignored.
    ///
    /// # Errors
    ///
    /// Returns `RouteError::Malformed` if the input is not a valid URL path
    /// and `RouteError::Unknown` if it names no page.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let base = Url::parse(PARSE_BASE)
            .map_err(|e| RouteError::Malformed(path.to_owned(), e.to_string()))?;
        let url = base
            .join(path)
            .map_err(|e| RouteError::Malformed(path.to_owned(), e.to_string()))?;

        let trimmed = url.path().trim_end_matches('/');
        match trimmed {
            "" => Ok(Self::Home),
            "/login" => Ok(Self::Login),
            "/supplier-signup" => Ok(Self::SupplierSignup),
            "/supplier" => Ok(Self::Supplier),
            "/supplier/profile" => Ok(Self::SupplierProfile),
            "/vendor" => Ok(Self::Vendor),
            "/checkout" => {
                let mut params = CheckoutParams::default();
                for (key, value) in url.query_pairs() {
                    match key.as_ref() {
                        "productId" => params.product_id = Some(ProductId::new(value.into_owned())),
                        "name" => params.name = Some(value.into_owned()),
                        "price" => params.price = Some(value.into_owned()),
                        _ => {}
                    }
                }
                Ok(Self::Checkout(params))
            }
            other => Err(RouteError::Unknown(other.to_owned())),
        }
    }

    /// Dashboard for a role. Anything other than a vendor lands on the
    /// supplier dashboard.
    #[must_use]
    pub const fn dashboard_for(role: Option<Role>) -> Self {
        match role {
            Some(Role::Vendor) => Self::Vendor,
            Some(Role::Supplier) | None => Self::Supplier,
        }
    }

    /// Returns `true` for pages that redirect to login without a session.
    #[must_use]
    pub const fn requires_session(&self) -> bool {
        matches!(self, Self::Supplier | Self::SupplierProfile)
    }

    /// The page to show for a navigation attempt.
    #[must_use]
    pub fn guard(self, session: Option<&Session>) -> Self {
        if self.requires_session() && session.is_none() {
            return Self::Login;
        }
        self
    }

    /// Path and query string for this route.
    #[must_use]
    pub fn to_path(&self) -> String {
        match self {
            Self::Home => "/".to_owned(),
            Self::Login => "/login".to_owned(),
            Self::SupplierSignup => "/supplier-signup".to_owned(),
            Self::Supplier => "/supplier".to_owned(),
            Self::SupplierProfile => "/supplier/profile".to_owned(),
            Self::Vendor => "/vendor".to_owned(),
            Self::Checkout(params) => {
                let mut query = url::form_urlencoded::Serializer::new(String::new());
                if let Some(id) = &params.product_id {
                    query.append_pair("productId", id.as_str());
                }
                if let Some(name) = &params.name {
                    query.append_pair("name", name);
                }
                if let Some(price) = &params.price {
                    query.append_pair("price", price);
                }
                let query = query.finish();
                if query.is_empty() {
                    "/checkout".to_owned()
                } else {
                    format!("/checkout?{query}")
                }
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}
