//! Cart entries and the cart reconciler.
//!
//! The backend only knows which product ids are in the cart and how many of
//! each. Everything the cart panel displays (names, images, subtotals) comes
//! from joining those entries against the product catalog.
//!
//! Line items are never patched in place. Whenever the cart entries or the
//! catalog change, the line items are rebuilt from both lists.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::product::Product;
use crate::types::{Price, ProductId};

/// Server-side cart record: a product id and the desired quantity.
///
/// Wire format: `{ "productId": "KCRwjF7lN97HnEaY", "qty": 3 }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartEntry {
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    #[serde(rename = "qty")]
    pub quantity: u32,
}

impl CartEntry {
    /// Create a cart entry.
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A cart entry joined with its product details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineItem {
    pub product: Product,
    pub quantity: u32,
    /// `product.cost * quantity`
    pub subtotal: Price,
}

impl CartLineItem {
    fn new(product: &Product, quantity: u32) -> Self {
        Self {
            product: product.clone(),
            quantity,
            subtotal: product.cost.times(quantity),
        }
    }
}

/// Join cart entries against the catalog.
///
/// Yields one [`CartLineItem`] per entry, in entry order. Entries whose
/// product id is not in `products` are skipped. If the catalog lists the same
/// id more than once, the first listing wins.
pub fn reconcile<'a>(
    entries: &'a [CartEntry],
    products: &'a [Product],
) -> impl Iterator<Item = CartLineItem> + 'a {
    let mut index: HashMap<&ProductId, &Product> = HashMap::with_capacity(products.len());
    for product in products {
        index.entry(&product.id).or_insert(product);
    }

    entries.iter().filter_map(move |entry| {
        index
            .get(&entry.product_id)
            .map(|product| CartLineItem::new(product, entry.quantity))
    })
}

/// Position of `product_id` in the cart, if present.
#[must_use]
pub fn position_in_cart(entries: &[CartEntry], product_id: &ProductId) -> Option<usize> {
    entries
        .iter()
        .position(|entry| &entry.product_id == product_id)
}

/// Reconciled cart contents with totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartLineItems {
    items: Vec<CartLineItem>,
}

impl CartLineItems {
    /// Reconcile `entries` against `products` and collect the result.
    #[must_use]
    pub fn reconcile(entries: &[CartEntry], products: &[Product]) -> Self {
        Self {
            items: reconcile(entries, products).collect(),
        }
    }

    /// The line items, in cart order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Iterate over the line items.
    pub fn iter(&self) -> std::slice::Iter<'_, CartLineItem> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all subtotals.
    #[must_use]
    pub fn total_value(&self) -> Price {
        self.items.iter().map(|item| item.subtotal).sum()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

impl<'a> IntoIterator for &'a CartLineItems {
    type Item = &'a CartLineItem;
    type IntoIter = std::slice::Iter<'a, CartLineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::types::Rating;

    fn product(id: &str, cost: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            category: "Test".to_string(),
            cost: Price::from_units(cost),
            rating: Rating::new(4).unwrap(),
            image_url: format!("https://img.example/{id}.png"),
        }
    }

    #[test]
    fn test_subtotal_is_cost_times_quantity() {
        let entries = vec![CartEntry::new("a", 2)];
        let products = vec![product("a", 50)];

        let items: Vec<_> = reconcile(&entries, &products).collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].subtotal, Price::from_units(100));
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn test_empty_catalog_yields_empty_cart() {
        let entries = vec![CartEntry::new("x", 1)];
        assert_eq!(reconcile(&entries, &[]).count(), 0);
    }

    #[test]
    fn test_empty_entries_yield_empty_cart() {
        let products = vec![product("a", 10)];
        assert_eq!(reconcile(&[], &products).count(), 0);
    }

    #[test]
    fn test_unknown_products_dropped_and_order_kept() {
        let entries = vec![
            CartEntry::new("c", 1),
            CartEntry::new("missing", 4),
            CartEntry::new("a", 3),
        ];
        let products = vec![product("a", 10), product("b", 20), product("c", 30)];

        let ids: Vec<_> = reconcile(&entries, &products)
            .map(|item| item.product.id.into_inner())
            .collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn test_duplicate_catalog_ids_use_first_listing() {
        let entries = vec![CartEntry::new("a", 1)];
        let products = vec![product("a", 10), product("a", 99)];

        let items: Vec<_> = reconcile(&entries, &products).collect();
        assert_eq!(items[0].subtotal, Price::from_units(10));
    }

    #[test]
    fn test_position_in_cart() {
        let entries = vec![CartEntry::new("a", 1), CartEntry::new("b", 2)];
        assert_eq!(position_in_cart(&entries, &ProductId::new("b")), Some(1));
        assert_eq!(position_in_cart(&entries, &ProductId::new("z")), None);
        assert_eq!(position_in_cart(&[], &ProductId::new("a")), None);
    }

    #[test]
    fn test_totals() {
        let entries = vec![CartEntry::new("a", 2), CartEntry::new("b", 3)];
        let products = vec![product("a", 50), product("b", 10)];

        let cart = CartLineItems::reconcile(&entries, &products);
        assert_eq!(cart.total_value(), Price::from_units(130));
        assert_eq!(cart.total_quantity(), 5);
        assert_eq!(CartLineItems::default().total_value(), Price::ZERO);
    }

    #[test]
    fn test_cart_entry_wire_format() {
        let entry: CartEntry =
            serde_json::from_str(r#"{"productId":"KCRwjF7lN97HnEaY","qty":3}"#).unwrap();
        assert_eq!(entry, CartEntry::new("KCRwjF7lN97HnEaY", 3));
    }

    fn arb_ids() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-e]", 0..12)
    }

    proptest! {
        #[test]
        fn prop_reconciled_items_reference_known_products(
            entry_ids in arb_ids(),
            product_ids in arb_ids(),
            quantity in 1u32..20,
        ) {
            let entries: Vec<_> = entry_ids.iter().map(|id| CartEntry::new(id.as_str(), quantity)).collect();
            let products: Vec<_> = product_ids.iter().map(|id| product(id, 7)).collect();

            let items: Vec<_> = reconcile(&entries, &products).collect();
            prop_assert!(items.len() <= entries.len());
            for item in &items {
                prop_assert!(products.iter().any(|p| p.id == item.product.id));
            }
        }

        #[test]
        fn prop_reconcile_is_idempotent(
            entry_ids in arb_ids(),
            product_ids in arb_ids(),
        ) {
            let entries: Vec<_> = entry_ids.iter().map(|id| CartEntry::new(id.as_str(), 1)).collect();
            let products: Vec<_> = product_ids.iter().map(|id| product(id, 3)).collect();

            prop_assert_eq!(
                CartLineItems::reconcile(&entries, &products),
                CartLineItems::reconcile(&entries, &products)
            );
        }
    }
}
