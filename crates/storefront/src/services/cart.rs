//! Cart service.
//!
//! The backend owns the cart. The client keeps the last list of entries the
//! backend returned together with the line items reconciled from it, and
//! replaces both wholesale after every successful update. A failed update
//! leaves the previous cart untouched; there is nothing to roll back because
//! nothing is applied optimistically.

use qkart_core::{CartEntry, CartLineItems, Product, ProductId, position_in_cart};
use tracing::instrument;

use crate::api::CartBackend;
use crate::error::{Result, StorefrontError};
use crate::session::Session;

/// The cached cart: server entries plus their reconciled line items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    entries: Vec<CartEntry>,
    items: CartLineItems,
}

impl CartState {
    /// An empty cart, as shown to anonymous users.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the cart from server entries, reconciled against `products`.
    #[must_use]
    pub fn from_entries(entries: Vec<CartEntry>, products: &[Product]) -> Self {
        let items = CartLineItems::reconcile(&entries, products);
        Self { entries, items }
    }

    /// The same entries reconciled against a new catalog.
    #[must_use]
    pub fn recompute(&self, products: &[Product]) -> Self {
        Self::from_entries(self.entries.clone(), products)
    }

    /// Entries as last returned by the backend, including any whose product
    /// is missing from the catalog.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Line items for display.
    #[must_use]
    pub const fn items(&self) -> &CartLineItems {
        &self.items
    }

    /// Index of `product_id` among the entries.
    #[must_use]
    pub fn position(&self, product_id: &ProductId) -> Option<usize> {
        position_in_cart(&self.entries, product_id)
    }

    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.position(product_id).is_some()
    }
}

/// How an add-or-update request treats a product already in the cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddOptions {
    /// Refuse the request instead of overwriting the quantity.
    pub prevent_duplicate: bool,
}

impl AddOptions {
    /// Options for the "Add to cart" button.
    #[must_use]
    pub const fn add() -> Self {
        Self {
            prevent_duplicate: true,
        }
    }

    /// Options for quantity changes from the cart panel.
    #[must_use]
    pub const fn update() -> Self {
        Self {
            prevent_duplicate: false,
        }
    }
}

/// Cart operations against a [`CartBackend`].
pub struct CartService<'a, B> {
    backend: &'a B,
}

impl<'a, B: CartBackend> CartService<'a, B> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Fetch the cart for `session` and reconcile it against `products`.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::AuthRequired` without calling the backend if
    /// nobody is logged in, or the backend failure otherwise.
    #[instrument(skip_all)]
    pub async fn load(&self, session: &Session, products: &[Product]) -> Result<CartState> {
        let token = session.token().ok_or(StorefrontError::AuthRequired)?;
        let entries = self.backend.fetch_cart(token).await?;
        Ok(CartState::from_entries(entries, products))
    }

    /// Set the quantity of `product_id` and return the cart the backend
    /// answered with.
    ///
    /// A quantity of 0 asks the backend to remove the product.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::AuthRequired` if nobody is logged in and
    /// `StorefrontError::DuplicateItem` if `options.prevent_duplicate` is set
    /// and the product is already in `cart`; neither reaches the backend.
    /// Backend failures are returned as-is and `cart` remains the current
    /// cart.
    #[instrument(skip(self, cart, session, products), fields(product_id = %product_id))]
    pub async fn add_or_update(
        &self,
        cart: &CartState,
        session: &Session,
        products: &[Product],
        product_id: &ProductId,
        quantity: u32,
        options: AddOptions,
    ) -> Result<CartState> {
        let token = session.token().ok_or(StorefrontError::AuthRequired)?;

        if options.prevent_duplicate && cart.contains(product_id) {
            return Err(StorefrontError::DuplicateItem(product_id.clone()));
        }

        let entries = self
            .backend
            .update_cart(token, product_id, quantity)
            .await?;

        tracing::debug!(entries = entries.len(), "Cart replaced from backend");
        Ok(CartState::from_entries(entries, products))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use qkart_core::{Price, Rating};
    use secrecy::{ExposeSecret, SecretString};

    use super::*;
    use crate::api::ApiError;

    fn product(id: &str, cost: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            category: "Test".to_string(),
            cost: Price::from_units(cost),
            rating: Rating::new(5).unwrap(),
            image_url: String::new(),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![product("a", 50), product("b", 20)]
    }

    fn logged_in() -> Session {
        Session::authenticated(SecretString::from("tok"), "crio.do")
    }

    /// In-memory backend that records every call.
    #[derive(Default)]
    struct FakeCart {
        entries: Mutex<Vec<CartEntry>>,
        calls: Mutex<Vec<String>>,
        fail_with: Option<u16>,
    }

    impl FakeCart {
        fn with_entries(entries: Vec<CartEntry>) -> Self {
            Self {
                entries: Mutex::new(entries),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CartBackend for FakeCart {
        async fn fetch_cart(&self, token: &SecretString) -> std::result::Result<Vec<CartEntry>, ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("fetch:{}", token.expose_secret()));
            Ok(self.entries.lock().unwrap().clone())
        }

        async fn update_cart(
            &self,
            _token: &SecretString,
            product_id: &ProductId,
            quantity: u32,
        ) -> std::result::Result<Vec<CartEntry>, ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("update:{product_id}:{quantity}"));

            if let Some(status) = self.fail_with {
                return Err(if status == 404 {
                    ApiError::NotFound("Product doesn't exist".to_string())
                } else {
                    ApiError::Api {
                        status,
                        message: "boom".to_string(),
                    }
                });
            }

            let mut entries = self.entries.lock().unwrap();
            match entries.iter().position(|e| &e.product_id == product_id) {
                Some(i) if quantity == 0 => {
                    entries.remove(i);
                }
                Some(i) => entries[i].quantity = quantity,
                None if quantity > 0 => entries.push(CartEntry::new(product_id.clone(), quantity)),
                None => {}
            }
            Ok(entries.clone())
        }
    }

    #[test]
    fn test_cart_state_reconciles() {
        let cart = CartState::from_entries(
            vec![CartEntry::new("a", 2), CartEntry::new("ghost", 1)],
            &catalog(),
        );
        assert_eq!(cart.entries().len(), 2);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items().total_value(), Price::from_units(100));
        assert_eq!(cart.position(&ProductId::new("ghost")), Some(1));
        assert!(!cart.contains(&ProductId::new("b")));
    }

    #[test]
    fn test_recompute_against_new_catalog() {
        let cart = CartState::from_entries(vec![CartEntry::new("a", 1)], &[]);
        assert!(cart.items().is_empty());

        let cart = cart.recompute(&catalog());
        assert_eq!(cart.items().len(), 1);
    }

    #[tokio::test]
    async fn test_load_requires_login() {
        let backend = FakeCart::default();
        let err = CartService::new(&backend)
            .load(&Session::anonymous(), &catalog())
            .await
            .unwrap_err();

        assert!(matches!(err, StorefrontError::AuthRequired));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_load_uses_token() {
        let backend = FakeCart::with_entries(vec![CartEntry::new("b", 3)]);
        let cart = CartService::new(&backend)
            .load(&logged_in(), &catalog())
            .await
            .unwrap();

        assert_eq!(cart.items().total_quantity(), 3);
        assert_eq!(backend.calls(), vec!["fetch:tok"]);
    }

    #[tokio::test]
    async fn test_add_without_login_makes_no_call() {
        let backend = FakeCart::default();
        let err = CartService::new(&backend)
            .add_or_update(
                &CartState::empty(),
                &Session::anonymous(),
                &catalog(),
                &ProductId::new("a"),
                1,
                AddOptions::add(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Login to add an item to the Cart");
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_refused_without_call() {
        let backend = FakeCart::with_entries(vec![CartEntry::new("a", 1)]);
        let service = CartService::new(&backend);
        let cart = service.load(&logged_in(), &catalog()).await.unwrap();

        let err = service
            .add_or_update(
                &cart,
                &logged_in(),
                &catalog(),
                &ProductId::new("a"),
                1,
                AddOptions::add(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StorefrontError::DuplicateItem(ref id) if id.as_str() == "a"));
        assert_eq!(backend.calls(), vec!["fetch:tok"]);
    }

    #[tokio::test]
    async fn test_update_replaces_cart() {
        let backend = FakeCart::with_entries(vec![CartEntry::new("a", 1)]);
        let service = CartService::new(&backend);
        let cart = service.load(&logged_in(), &catalog()).await.unwrap();

        let cart = service
            .add_or_update(
                &cart,
                &logged_in(),
                &catalog(),
                &ProductId::new("a"),
                4,
                AddOptions::update(),
            )
            .await
            .unwrap();
        assert_eq!(cart.entries(), &[CartEntry::new("a", 4)]);
        assert_eq!(cart.items().total_value(), Price::from_units(200));

        let cart = service
            .add_or_update(
                &cart,
                &logged_in(),
                &catalog(),
                &ProductId::new("b"),
                1,
                AddOptions::add(),
            )
            .await
            .unwrap();
        assert_eq!(cart.items().len(), 2);
    }

    #[tokio::test]
    async fn test_zero_quantity_removes() {
        let backend = FakeCart::with_entries(vec![CartEntry::new("a", 1), CartEntry::new("b", 2)]);
        let service = CartService::new(&backend);
        let cart = service.load(&logged_in(), &catalog()).await.unwrap();

        let cart = service
            .add_or_update(
                &cart,
                &logged_in(),
                &catalog(),
                &ProductId::new("a"),
                0,
                AddOptions::update(),
            )
            .await
            .unwrap();
        assert_eq!(cart.entries(), &[CartEntry::new("b", 2)]);
        assert_eq!(backend.calls().last().unwrap(), "update:a:0");
    }

    #[tokio::test]
    async fn test_failure_keeps_prior_cart() {
        let mut backend = FakeCart::with_entries(vec![CartEntry::new("a", 2)]);
        backend.fail_with = Some(404);
        let service = CartService::new(&backend);
        let cart = service.load(&logged_in(), &catalog()).await.unwrap();
        let before = cart.clone();

        let result = service
            .add_or_update(
                &cart,
                &logged_in(),
                &catalog(),
                &ProductId::new("nope"),
                1,
                AddOptions::add(),
            )
            .await;

        assert!(matches!(result, Err(StorefrontError::NotFound(_))));
        assert_eq!(cart, before);
    }
}
