//! India Bazzar marketplace library.
//!
//! Client-side domain logic for a marketplace connecting street-food vendors
//! with suppliers. Persistence, authentication, phone verification, postal
//! and geocoding lookups and payments are external collaborators, each
//! reached through a narrow trait:
//!
//! - [`store::DocumentStore`] - hosted document database with live queries
//! - [`auth::AuthProvider`] - email/password identities
//! - [`verification::VerificationProvider`] - SMS one-time codes
//! - [`lookup`] - postal code, reverse geocoding and device location
//! - [`payment::PaymentGateway`] - client-side checkout widget
//!
//! On top of those sit the signup workflow ([`services::signup`]), the live
//! listing view ([`sync`]), and the supplier/vendor services.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod cart;
pub mod config;
pub mod db;
pub mod error;
pub mod lookup;
pub mod models;
pub mod payment;
pub mod routes;
pub mod services;
pub mod store;
pub mod sync;
pub mod validation;
pub mod verification;
