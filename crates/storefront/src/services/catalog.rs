//! Catalog view state.
//!
//! The catalog keeps two lists: everything the backend returned from the last
//! full fetch, and what is currently on screen. A search narrows the displayed
//! list. A search that failed for any reason other than "no matches" falls
//! back to the full catalog so the user is never left with a blank page.

use qkart_core::{Product, ProductId};

use crate::error::StorefrontError;

/// What the product grid shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Listing {
    /// The displayed products.
    #[default]
    Products,
    /// The "No products found" placeholder.
    NoResults,
}

/// Snapshot of the catalog as the user sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogState {
    all: Vec<Product>,
    displayed: Vec<Product>,
    listing: Listing,
}

impl CatalogState {
    /// State right after a successful full fetch.
    #[must_use]
    pub fn loaded(products: Vec<Product>) -> Self {
        Self {
            displayed: products.clone(),
            all: products,
            listing: Listing::Products,
        }
    }

    /// State after a search finished with `result`.
    #[must_use]
    pub fn after_search(&self, result: &Result<Vec<Product>, StorefrontError>) -> Self {
        match result {
            Ok(products) => Self {
                all: self.all.clone(),
                displayed: products.clone(),
                listing: Listing::Products,
            },
            Err(StorefrontError::NotFound(_)) => Self {
                all: self.all.clone(),
                displayed: self.displayed.clone(),
                listing: Listing::NoResults,
            },
            Err(_) => Self::loaded(self.all.clone()),
        }
    }

    /// The full catalog from the last successful fetch.
    #[must_use]
    pub fn all(&self) -> &[Product] {
        &self.all
    }

    /// The products currently on screen.
    ///
    /// Only meaningful while [`listing`](Self::listing) is
    /// [`Listing::Products`].
    #[must_use]
    pub fn displayed(&self) -> &[Product] {
        &self.displayed
    }

    #[must_use]
    pub const fn listing(&self) -> Listing {
        self.listing
    }

    /// Look up a product in the full catalog.
    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.all.iter().find(|product| &product.id == id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use qkart_core::{Price, Rating};

    use super::*;

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            category: "Fashion".to_string(),
            cost: Price::from_units(50),
            rating: Rating::new(3).unwrap(),
            image_url: String::new(),
        }
    }

    fn catalog() -> CatalogState {
        CatalogState::loaded(vec![
            product("a", "Tan Leatherette Weekender Duffle"),
            product("b", "Black Round Sunglasses"),
            product("c", "Tan Shoes"),
        ])
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_loaded_displays_everything() {
        let state = catalog();
        assert_eq!(state.listing(), Listing::Products);
        assert_eq!(state.displayed().len(), 3);
        assert_eq!(state.all(), state.displayed());
    }

    #[test]
    fn test_search_hits_narrow_display() {
        let state = catalog();
        let hits = vec![state.all()[0].clone(), state.all()[2].clone()];

        let next = state.after_search(&Ok(hits));
        assert_eq!(next.listing(), Listing::Products);
        assert_eq!(
            names(next.displayed()),
            vec!["Tan Leatherette Weekender Duffle", "Tan Shoes"]
        );
        assert_eq!(next.all().len(), 3);
    }

    #[test]
    fn test_search_not_found_shows_no_results() {
        let state = catalog();
        let next = state.after_search(&Err(StorefrontError::NotFound(
            "No products found".to_string(),
        )));

        assert_eq!(next.listing(), Listing::NoResults);
        assert_eq!(next.all(), state.all());
    }

    #[test]
    fn test_search_failure_falls_back_to_full_catalog() {
        let narrowed = catalog().after_search(&Ok(vec![product("b", "Black Round Sunglasses")]));
        assert_eq!(narrowed.displayed().len(), 1);

        let next = narrowed.after_search(&Err(StorefrontError::Server {
            status: 500,
            message: "boom".to_string(),
        }));
        assert_eq!(next.listing(), Listing::Products);
        assert_eq!(next.displayed(), next.all());
        assert_eq!(next.displayed().len(), 3);
    }

    #[test]
    fn test_results_after_no_results() {
        let state = catalog().after_search(&Err(StorefrontError::NotFound(String::new())));
        let next = state.after_search(&Ok(vec![product("c", "Tan Shoes")]));
        assert_eq!(next.listing(), Listing::Products);
        assert_eq!(names(next.displayed()), vec!["Tan Shoes"]);
    }

    #[test]
    fn test_find() {
        let state = catalog();
        assert_eq!(
            state.find(&ProductId::new("b")).unwrap().name,
            "Black Round Sunglasses"
        );
        assert!(state.find(&ProductId::new("zzz")).is_none());
    }
}
