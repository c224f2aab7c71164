//! In-memory composition of listings and their reviews.

use std::collections::{HashMap, HashSet};

use bazaar_core::ProductId;

use super::filter::apply_search_filter;
use crate::models::{ProductListing, Review};

/// Products that entered or left the view with one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDiff {
    pub added: Vec<ProductId>,
    pub removed: Vec<ProductId>,
}

/// A product together with its reviews.
///
/// `reviews` is `None` until the product's review list has been received, and
/// stays `None` if its review subscription could not be established.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListingEntry<'a> {
    pub product: &'a ProductListing,
    pub reviews: Option<&'a [Review]>,
}

/// Product id to listing and reviews, plus the search-filtered subsequence.
///
/// Review lists may arrive before their product; they are held until the
/// product shows up, so the composed view does not depend on arrival order.
#[derive(Debug, Default)]
pub struct LiveView {
    products: Vec<ProductListing>,
    reviews: HashMap<ProductId, Vec<Review>>,
    search_term: String,
    /// Indices into `products` that pass the search filter.
    visible: Vec<usize>,
}

impl LiveView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the product set with a new snapshot.
    ///
    /// Reviews of products that left the view are discarded.
    pub fn apply_products(&mut self, snapshot: Vec<ProductListing>) -> ProductDiff {
        let old: HashSet<&ProductId> = self.products.iter().map(|p| &p.id).collect();
        let new: HashSet<&ProductId> = snapshot.iter().map(|p| &p.id).collect();

        let added: Vec<ProductId> = snapshot
            .iter()
            .filter(|p| !old.contains(&p.id))
            .map(|p| p.id.clone())
            .collect();
        let removed: Vec<ProductId> = self
            .products
            .iter()
            .filter(|p| !new.contains(&p.id))
            .map(|p| p.id.clone())
            .collect();

        for id in &removed {
            self.reviews.remove(id);
        }
        self.products = snapshot;
        self.refilter();

        ProductDiff { added, removed }
    }

    /// Replace the review list of one product.
    pub fn apply_reviews(&mut self, product_id: ProductId, reviews: Vec<Review>) {
        self.reviews.insert(product_id, reviews);
    }

    /// Change the search term and recompute the visible subsequence.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.refilter();
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Every product in the current snapshot, newest first.
    #[must_use]
    pub fn products(&self) -> &[ProductListing] {
        &self.products
    }

    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.products.iter().any(|p| &p.id == product_id)
    }

    /// A product and its reviews, if the product is in the view.
    #[must_use]
    pub fn entry(&self, product_id: &ProductId) -> Option<ListingEntry<'_>> {
        self.products
            .iter()
            .find(|p| &p.id == product_id)
            .map(|product| self.entry_for(product))
    }

    /// Entries passing the search filter, in snapshot order.
    #[must_use]
    pub fn visible(&self) -> Vec<ListingEntry<'_>> {
        self.visible
            .iter()
            .filter_map(|&i| self.products.get(i))
            .map(|product| self.entry_for(product))
            .collect()
    }

    fn entry_for<'a>(&'a self, product: &'a ProductListing) -> ListingEntry<'a> {
        ListingEntry {
            product,
            reviews: self.reviews.get(&product.id).map(Vec::as_slice),
        }
    }

    fn refilter(&mut self) {
        let matching: HashSet<&ProductId> = apply_search_filter(&self.products, &self.search_term)
            .into_iter()
            .map(|p| &p.id)
            .collect();
        self.visible = self
            .products
            .iter()
            .enumerate()
            .filter(|(_, p)| matching.contains(&p.id))
            .map(|(i, _)| i)
            .collect();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use bazaar_core::ReviewId;

    use super::*;
    use crate::sync::filter::tests::listing;

    fn review(id: &str, product_id: &str, text: &str) -> Review {
        Review {
            id: ReviewId::new(id),
            product_id: ProductId::new(product_id),
            text: text.to_owned(),
            created_at: Utc::now(),
        }
    }

    fn assert_rice_with_good_review(view: &LiveView) {
        let entry = view.entry(&ProductId::new("p1")).unwrap();
        assert_eq!(entry.product.name, "Rice");
        let reviews = entry.reviews.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].text, "Good");
    }

    #[test]
    fn test_products_then_reviews() {
        let mut view = LiveView::new();
        view.apply_products(vec![listing("p1", "Rice", "", 0)]);
        view.apply_reviews(ProductId::new("p1"), vec![review("r1", "p1", "Good")]);
        assert_rice_with_good_review(&view);
    }

    #[test]
    fn test_reviews_then_products() {
        let mut view = LiveView::new();
        view.apply_reviews(ProductId::new("p1"), vec![review("r1", "p1", "Good")]);
        assert!(view.entry(&ProductId::new("p1")).is_none());

        view.apply_products(vec![listing("p1", "Rice", "", 0)]);
        assert_rice_with_good_review(&view);
    }

    #[test]
    fn test_diff() {
        let mut view = LiveView::new();
        let diff = view.apply_products(vec![listing("p1", "Rice", "", 2), listing("p2", "Dal", "", 1)]);
        assert_eq!(diff.added, [ProductId::new("p1"), ProductId::new("p2")]);
        assert!(diff.removed.is_empty());

        let diff = view.apply_products(vec![listing("p3", "Oil", "", 3), listing("p1", "Rice", "", 2)]);
        assert_eq!(diff.added, [ProductId::new("p3")]);
        assert_eq!(diff.removed, [ProductId::new("p2")]);
    }

    #[test]
    fn test_removed_product_drops_reviews() {
        let mut view = LiveView::new();
        view.apply_products(vec![listing("p1", "Rice", "", 0)]);
        view.apply_reviews(ProductId::new("p1"), vec![review("r1", "p1", "Good")]);
        view.apply_products(vec![]);
        view.apply_products(vec![listing("p1", "Rice", "", 0)]);
        assert!(view.entry(&ProductId::new("p1")).unwrap().reviews.is_none());
    }

    #[test]
    fn test_visible_follows_term_and_snapshot() {
        let mut view = LiveView::new();
        view.set_search_term("tom");
        view.apply_products(vec![listing("p1", "Tomato", "", 1), listing("p2", "Onion", "", 0)]);
        let names: Vec<_> = view.visible().iter().map(|e| e.product.name.clone()).collect();
        assert_eq!(names, ["Tomato"]);

        view.apply_products(vec![
            listing("p3", "Cherry tomato", "", 2),
            listing("p1", "Tomato", "", 1),
            listing("p2", "Onion", "", 0),
        ]);
        let names: Vec<_> = view.visible().iter().map(|e| e.product.name.clone()).collect();
        assert_eq!(names, ["Cherry tomato", "Tomato"]);

        view.set_search_term("");
        assert_eq!(view.visible().len(), 3);
        // The snapshot itself is untouched by filtering.
        assert_eq!(view.products().len(), 3);
    }
}
