//! Domain models for the marketplace.
//!
//! Field names serialize in camelCase to match the stored documents.
//! Timestamps are stored as milliseconds since the Unix epoch so that the
//! store can order on them numerically.

pub mod address;
pub mod product;
pub mod review;
pub mod user;

pub use address::{Address, AddressDetails};
pub use product::{NewProduct, ProductListing, ProductUpdate};
pub use review::{NewReview, Review};
pub use user::UserRecord;
