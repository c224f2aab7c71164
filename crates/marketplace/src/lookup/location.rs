//! Device location.

use std::future::Future;

use thiserror::Error;

use bazaar_core::Coordinates;

/// The device refused or failed to report its position.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PermissionError {
    #[error("Location permission denied")]
    Denied,

    #[error("Location unavailable")]
    Unavailable,
}

/// Source of the device's current position.
pub trait LocationProvider: Send + Sync {
    fn current_position(&self) -> impl Future<Output = Result<Coordinates, PermissionError>> + Send;
}

/// Location provider that always returns the same answer.
///
/// Used where no device location exists (CLI, tests).
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Result<Coordinates, PermissionError>);

impl FixedLocation {
    #[must_use]
    pub const fn at(coordinates: Coordinates) -> Self {
        Self(Ok(coordinates))
    }

    #[must_use]
    pub const fn denied() -> Self {
        Self(Err(PermissionError::Denied))
    }
}

impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, PermissionError> {
        self.0
    }
}
