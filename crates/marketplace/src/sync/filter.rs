//! Free-text search over listings.

use crate::models::ProductListing;

/// Listings whose name or description contains `term`, ignoring case.
///
/// An empty term matches everything. The input order is kept and the input
/// is never modified.
#[must_use]
pub fn apply_search_filter<'a>(snapshot: &'a [ProductListing], term: &str) -> Vec<&'a ProductListing> {
    let needle = term.to_lowercase();
    snapshot
        .iter()
        .filter(|product| product.matches_lowercase(&needle))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{TimeZone, Utc};

    use bazaar_core::{Price, ProductId, UserId};

    use super::*;

    pub(crate) fn listing(id: &str, name: &str, description: &str, created_ms: i64) -> ProductListing {
        ProductListing {
            id: ProductId::new(id),
            name: name.to_owned(),
            price: Price::ZERO,
            quantity: 1,
            description: description.to_owned(),
            supplier_id: UserId::new("s1"),
            created_at: Utc.timestamp_millis_opt(created_ms).single().unwrap_or_default(),
            location: None,
            address: None,
        }
    }

    fn names<'a>(products: &[&'a ProductListing]) -> Vec<&'a str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_matches_name_case_insensitively() {
        let snapshot = vec![listing("p1", "Tomato", "", 0), listing("p2", "Onion", "", 0)];
        assert_eq!(names(&apply_search_filter(&snapshot, "tom")), ["Tomato"]);
        assert_eq!(names(&apply_search_filter(&snapshot, "TOM")), ["Tomato"]);
    }

    #[test]
    fn test_matches_description() {
        let snapshot = vec![
            listing("p1", "Rice", "Basmati, aged", 0),
            listing("p2", "Onion", "Red, from Nashik", 0),
        ];
        assert_eq!(names(&apply_search_filter(&snapshot, "nashik")), ["Onion"]);
    }

    #[test]
    fn test_empty_term_keeps_everything_in_order() {
        let snapshot = vec![listing("p1", "Tomato", "", 0), listing("p2", "Onion", "", 0)];
        assert_eq!(names(&apply_search_filter(&snapshot, "")), ["Tomato", "Onion"]);
    }

    #[test]
    fn test_no_match() {
        let snapshot = vec![listing("p1", "Tomato", "", 0)];
        assert!(apply_search_filter(&snapshot, "paneer").is_empty());
    }
}
