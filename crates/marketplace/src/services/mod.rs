//! User-facing flows built on the collaborators and repositories.
//!
//! # Modules
//!
//! - [`signup`] - Multi-step supplier/vendor signup with phone verification
//! - [`login`] - Email/password sign-in and dashboard routing
//! - [`products`] - Supplier listing management
//! - [`reviews`] - Vendor reviews and per-product drafts
//! - [`addresses`] - Saved delivery addresses with lookup auto-fill
//! - [`checkout`] - Buy-now and cart checkout through the payment widget

pub mod addresses;
pub mod checkout;
pub mod login;
pub mod products;
pub mod reviews;
pub mod signup;
