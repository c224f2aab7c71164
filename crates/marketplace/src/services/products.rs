//! Supplier listing management.
//!
//! Only suppliers add listings, and only the owning supplier may edit or
//! delete one. Listings are stamped with the device location when it can be
//! read; otherwise they are saved without one.

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use bazaar_core::{Price, ProductId};

use crate::auth::Session;
use crate::db::{ProductRepository, RepositoryError};
use crate::lookup::LocationProvider;
use crate::models::{NewProduct, ProductListing, ProductUpdate};
use crate::store::DocumentStore;
use crate::validation::{ValidationError, parse_quantity, require};

/// Errors from listing management.
#[derive(Debug, Error)]
pub enum ProductError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Product not found: {0}")]
    NotFound(ProductId),

    #[error("You can only change your own products")]
    NotOwner,

    #[error("Only suppliers can list products")]
    NotSupplier,
}

/// The add-product form, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub quantity: String,
    pub description: String,
    pub address: String,
}

/// The edit-product form, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductEditForm {
    pub name: String,
    pub price: String,
    pub quantity: String,
    pub description: String,
}

impl ProductEditForm {
    /// Form prefilled from an existing listing.
    #[must_use]
    pub fn from_listing(product: &ProductListing) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.amount().normalize().to_string(),
            quantity: product.quantity.to_string(),
            description: product.description.clone(),
        }
    }

    fn validate(&self) -> Result<ProductUpdate, ValidationError> {
        let name = require("Name", &self.name)?;
        let price = Price::parse(require("Price", &self.price)?)?;
        let quantity = parse_quantity(require("Quantity", &self.quantity)?)?;
        Ok(ProductUpdate {
            name: name.to_owned(),
            price,
            quantity,
            description: self.description.trim().to_owned(),
        })
    }
}

/// Listing management for the signed-in supplier.
pub struct ProductService<'a, S, L> {
    store: &'a S,
    location: &'a L,
}

impl<'a, S: DocumentStore, L: LocationProvider> ProductService<'a, S, L> {
    #[must_use]
    pub const fn new(store: &'a S, location: &'a L) -> Self {
        Self { store, location }
    }

    /// Add a listing for the session's supplier.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotSupplier` unless the session is a supplier,
    /// `ProductError::Validation` for a blank or malformed field, and
    /// `ProductError::Repository` if the write fails.
    #[instrument(skip(self, session, form), fields(supplier_id = %session.uid))]
    pub async fn add(
        &self,
        session: &Session,
        form: &ProductForm,
    ) -> Result<ProductListing, ProductError> {
        if !session.is_supplier() {
            return Err(ProductError::NotSupplier);
        }

        let name = require("Name", &form.name)?;
        let price = Price::parse(require("Price", &form.price)?).map_err(ValidationError::from)?;
        let quantity = parse_quantity(require("Quantity", &form.quantity)?)?;
        let address = require("Address", &form.address)?;

        let location = match self.location.current_position().await {
            Ok(coordinates) => Some(coordinates),
            Err(e) => {
                warn!(error = %e, "Saving product without location");
                None
            }
        };

        let product = ProductRepository::new(self.store)
            .create(NewProduct {
                name: name.to_owned(),
                price,
                quantity,
                description: form.description.trim().to_owned(),
                supplier_id: session.uid.clone(),
                created_at: Utc::now(),
                location,
                address: Some(address.to_owned()),
            })
            .await?;

        info!(product_id = %product.id, "Product added");
        Ok(product)
    }

    /// Overwrite the editable fields of one of the supplier's listings.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` if the listing is gone,
    /// `ProductError::NotOwner` if it belongs to someone else, and
    /// `ProductError::Validation` for a blank or malformed field.
    #[instrument(skip(self, session, form), fields(uid = %session.uid))]
    pub async fn update(
        &self,
        session: &Session,
        id: &ProductId,
        form: &ProductEditForm,
    ) -> Result<ProductListing, ProductError> {
        let update = form.validate()?;
        let mut product = self.owned(session, id).await?;

        ProductRepository::new(self.store)
            .update(id, &update)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ProductError::NotFound(id.clone()),
                other => ProductError::Repository(other),
            })?;

        product.apply(update);
        info!(product_id = %id, "Product updated");
        Ok(product)
    }

    /// Delete one of the supplier's listings.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` if the listing is gone and
    /// `ProductError::NotOwner` if it belongs to someone else.
    #[instrument(skip(self, session), fields(uid = %session.uid))]
    pub async fn delete(&self, session: &Session, id: &ProductId) -> Result<(), ProductError> {
        self.owned(session, id).await?;
        ProductRepository::new(self.store).delete(id).await?;
        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    async fn owned(&self, session: &Session, id: &ProductId) -> Result<ProductListing, ProductError> {
        let product = ProductRepository::new(self.store)
            .get(id)
            .await?
            .ok_or_else(|| ProductError::NotFound(id.clone()))?;
        if product.supplier_id != session.uid {
            return Err(ProductError::NotOwner);
        }
        Ok(product)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::{Coordinates, Email, Role, UserId};

    use super::*;
    use crate::lookup::FixedLocation;
    use crate::store::{CollectionPath, MemoryStore};

    fn session(uid: &str, role: Role) -> Session {
        Session {
            uid: UserId::new(uid),
            email: Email::parse(&format!("{uid}@example.com")).unwrap(),
            role: Some(role),
        }
    }

    fn form() -> ProductForm {
        ProductForm {
            name: "Tomato".into(),
            price: "40".into(),
            quantity: "25".into(),
            description: "Fresh, per kg".into(),
            address: "Market Yard, Pune".into(),
        }
    }

    #[tokio::test]
    async fn test_add_attaches_location() {
        let store = MemoryStore::new();
        let location = FixedLocation::at(Coordinates::new(18.52, 73.85));
        let service = ProductService::new(&store, &location);

        let product = service.add(&session("s1", Role::Supplier), &form()).await.unwrap();
        assert_eq!(product.supplier_id, UserId::new("s1"));
        assert_eq!(product.location, Some(Coordinates::new(18.52, 73.85)));
        assert_eq!(product.address.as_deref(), Some("Market Yard, Pune"));
        assert_eq!(store.count(&CollectionPath::products()), 1);
    }

    #[tokio::test]
    async fn test_add_without_location() {
        let store = MemoryStore::new();
        let location = FixedLocation::denied();
        let service = ProductService::new(&store, &location);

        let product = service.add(&session("s1", Role::Supplier), &form()).await.unwrap();
        assert_eq!(product.location, None);
    }

    #[tokio::test]
    async fn test_add_validates_fields() {
        let store = MemoryStore::new();
        let location = FixedLocation::denied();
        let service = ProductService::new(&store, &location);
        let supplier = session("s1", Role::Supplier);

        let mut bad = form();
        bad.address = String::new();
        let err = service.add(&supplier, &bad).await.unwrap_err();
        assert_eq!(err.to_string(), "Address is required");

        let mut bad = form();
        bad.price = "-3".into();
        assert!(matches!(
            service.add(&supplier, &bad).await,
            Err(ProductError::Validation(ValidationError::Price(_)))
        ));

        let mut bad = form();
        bad.price = "forty".into();
        assert!(matches!(
            service.add(&supplier, &bad).await,
            Err(ProductError::Validation(ValidationError::Price(_)))
        ));

        let mut bad = form();
        bad.quantity = "2.5".into();
        assert!(matches!(
            service.add(&supplier, &bad).await,
            Err(ProductError::Validation(ValidationError::InvalidQuantity))
        ));
        assert_eq!(store.count(&CollectionPath::products()), 0);
    }

    #[tokio::test]
    async fn test_vendor_cannot_add() {
        let store = MemoryStore::new();
        let location = FixedLocation::denied();
        let service = ProductService::new(&store, &location);
        assert!(matches!(
            service.add(&session("v1", Role::Vendor), &form()).await,
            Err(ProductError::NotSupplier)
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete_require_ownership() {
        let store = MemoryStore::new();
        let location = FixedLocation::denied();
        let service = ProductService::new(&store, &location);
        let owner = session("s1", Role::Supplier);
        let other = session("s2", Role::Supplier);

        let product = service.add(&owner, &form()).await.unwrap();
        let mut edit = ProductEditForm::from_listing(&product);
        edit.price = "45.50".into();

        assert!(matches!(
            service.update(&other, &product.id, &edit).await,
            Err(ProductError::NotOwner)
        ));
        assert!(matches!(
            service.delete(&other, &product.id).await,
            Err(ProductError::NotOwner)
        ));

        let updated = service.update(&owner, &product.id, &edit).await.unwrap();
        assert_eq!(updated.price, Price::parse("45.5").unwrap());
        let stored = ProductRepository::new(&store).get(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.price, Price::parse("45.5").unwrap());

        service.delete(&owner, &product.id).await.unwrap();
        assert!(matches!(
            service.delete(&owner, &product.id).await,
            Err(ProductError::NotFound(_))
        ));
    }
}
