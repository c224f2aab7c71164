//! Address book tests: the three-address cap and lookup auto-fill.

#![allow(clippy::unwrap_used)]

use bazaar_core::{Email, Role, UserId};
use bazaar_integration_tests::{FixedGeocoder, TestContext};
use bazaar_marketplace::auth::Session;
use bazaar_marketplace::error::{AppError, ErrorKind};
use bazaar_marketplace::lookup::{FixedLocation, GeocodedAddress};
use bazaar_marketplace::models::AddressDetails;
use bazaar_marketplace::services::addresses::{
    AddressBook, fill_from_current_location, fill_from_pincode,
};

fn session(uid: &str) -> Session {
    Session {
        uid: UserId::new(uid),
        email: Email::parse(&format!("{uid}@example.com")).unwrap(),
        role: Some(Role::Vendor),
    }
}

fn typed_address(flat: &str) -> AddressDetails {
    AddressDetails {
        full_name: "Ravi Kumar".into(),
        mobile: "9123456780".into(),
        pincode: "411001".into(),
        flat: flat.into(),
        street: "FC Road".into(),
        landmark: "Near the temple".into(),
        city: "Pune".into(),
        state: "Maharashtra".into(),
    }
}

#[tokio::test]
async fn test_cap_is_per_user() {
    let ctx = TestContext::new();
    let ravi = session("ravi");
    let meena = session("meena");
    let ravi_book = AddressBook::new(&ctx.store, &ravi);
    let meena_book = AddressBook::new(&ctx.store, &meena);

    for flat in ["1", "2", "3"] {
        ravi_book.add(typed_address(flat)).await.unwrap();
    }
    let err = AppError::from(ravi_book.add(typed_address("4")).await.unwrap_err());
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.user_message(), "You can only save up to 3 addresses!");

    meena_book.add(typed_address("9")).await.unwrap();
    assert_eq!(meena_book.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_pincode_fill_then_save() {
    let ctx = TestContext::new();
    let ravi = session("ravi");
    let book = AddressBook::new(&ctx.store, &ravi);

    let mut form = AddressDetails {
        full_name: "Ravi Kumar".into(),
        mobile: "9123456780".into(),
        flat: "4B".into(),
        street: "Janpath".into(),
        ..AddressDetails::default()
    };
    for typed in ["1", "11", "110", "1100", "11000"] {
        assert!(fill_from_pincode(&mut form, typed, &ctx.postal).await.unwrap().is_none());
    }
    fill_from_pincode(&mut form, "110001", &ctx.postal).await.unwrap();
    assert_eq!(form.city, "New Delhi");
    assert_eq!(form.state, "Delhi");

    let saved = book.add(form).await.unwrap();
    assert_eq!(saved.details.one_line(), "4B, Janpath, New Delhi, Delhi - 110001");
}

#[tokio::test]
async fn test_unknown_pincode_is_a_lookup_error() {
    let ctx = TestContext::new();
    let mut form = AddressDetails::default();
    let err = AppError::from(
        fill_from_pincode(&mut form, "999999", &ctx.postal)
            .await
            .unwrap_err(),
    );
    assert_eq!(err.kind(), ErrorKind::Lookup);
    assert_eq!(err.user_message(), "Invalid Pincode. Please enter a valid one.");
    assert!(form.city.is_empty());
}

#[tokio::test]
async fn test_current_location_fill() {
    let ctx = TestContext::new();
    let geocoder = FixedGeocoder(GeocodedAddress {
        house_number: Some("21".into()),
        street: Some("Laxmi Road".into()),
        city: Some("Pune".into()),
        state: Some("Maharashtra".into()),
        postcode: Some("411030".into()),
    });
    let mut form = AddressDetails::default();

    fill_from_current_location(&mut form, &ctx.location, &geocoder)
        .await
        .unwrap();
    assert_eq!(form.flat, "21");
    assert_eq!(form.street, "Laxmi Road");
    assert_eq!(form.pincode, "411030");
}

#[tokio::test]
async fn test_location_denied_degrades_to_manual_entry() {
    let geocoder = FixedGeocoder::default();
    let mut form = typed_address("7");

    let err = AppError::from(
        fill_from_current_location(&mut form, &FixedLocation::denied(), &geocoder)
            .await
            .unwrap_err(),
    );
    assert_eq!(err.kind(), ErrorKind::Permission);
    assert_eq!(form, typed_address("7"));
}
