//! India Bazzar Core - Shared types library.
//!
//! This crate provides the domain types used across the marketplace crates:
//! - `marketplace` - Signup workflow, listing sync and supplier/vendor services
//! - `cli` - Developer tooling for lookups and validation
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no network
//! clients, no store access. This keeps it lightweight and usable anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, contact details, business
//!   registration numbers, prices, roles and coordinates

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
