//! The storefront context.
//!
//! [`Storefront`] owns everything a front end needs: configuration, the API
//! client, the session store, and the current session, catalog and cart.
//! Front ends read state through the accessors and change it only through
//! the operations below, each of which swaps in a freshly built value on
//! success and leaves the previous one in place on failure.

use std::sync::Arc;
use std::time::Duration;

use qkart_core::{LoginForm, ProductId, RegistrationForm};
use tokio::sync::mpsc;
use tracing::instrument;

use crate::api::{ApiClient, CatalogBackend};
use crate::config::StorefrontConfig;
use crate::error::{
    Action, Notice, Result, StorefrontError, add_breadcrumb, clear_sentry_user, set_sentry_user,
};
use crate::services::{
    AddOptions, AuthService, CartService, CartState, CatalogState, Debouncer, SearchResponse,
    search_debouncer,
};
use crate::session::{FileSessionStore, Session, SessionStore};

/// Fetch failures collected by [`Storefront::start`], in the order they
/// happened.
#[derive(Debug, Default)]
#[must_use]
pub struct StartupErrors {
    errors: Vec<(Action, StorefrontError)>,
}

impl StartupErrors {
    /// Whether the fetch for `action` failed.
    #[must_use]
    pub fn failed(&self, action: Action) -> bool {
        self.errors.iter().any(|(failed, _)| *failed == action)
    }

    /// The first failure, if any.
    ///
    /// # Errors
    ///
    /// Returns the first failed fetch; later failures are dropped.
    pub fn into_result(self) -> Result<()> {
        self.errors.into_iter().next().map_or(Ok(()), |(_, e)| Err(e))
    }
}

impl IntoIterator for StartupErrors {
    type Item = (Action, StorefrontError);
    type IntoIter = std::vec::IntoIter<(Action, StorefrontError)>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

/// Application context for a storefront front end.
pub struct Storefront {
    config: StorefrontConfig,
    api: ApiClient,
    store: Arc<dyn SessionStore>,
    session: Session,
    catalog: CatalogState,
    cart: CartState,
}

impl Storefront {
    /// Create the context and restore the persisted session from `store`.
    ///
    /// A session that cannot be read is logged and treated as anonymous.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
        let api = ApiClient::new(&config)?;

        let session = store.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not read saved session, continuing logged out");
            Session::anonymous()
        });
        if let Some(username) = session.username() {
            set_sentry_user(username);
        }

        Ok(Self {
            config,
            api,
            store,
            session,
            catalog: CatalogState::default(),
            cart: CartState::empty(),
        })
    }

    /// Create the context with the session kept at `config.session_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: StorefrontConfig) -> Result<Self> {
        let store = Arc::new(FileSessionStore::new(config.session_path.clone()));
        Self::new(config, store)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn catalog(&self) -> &CatalogState {
        &self.catalog
    }

    #[must_use]
    pub const fn cart(&self) -> &CartState {
        &self.cart
    }

    /// Quiet period for debounced searches.
    #[must_use]
    pub const fn search_delay(&self) -> Duration {
        self.config.search_debounce
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Load the catalog and, for a logged-in user, the cart.
    ///
    /// Both fetches are attempted even if the other one fails. The cart is
    /// reconciled against whatever catalog is current once the catalog
    /// fetch has finished, so a failed catalog fetch leaves cart entries
    /// without line items until the next successful refresh.
    pub async fn start(&mut self) -> StartupErrors {
        let mut errors = Vec::new();

        if let Err(e) = self.refresh_catalog().await {
            errors.push((Action::FetchProducts, e));
        }
        if self.session.is_authenticated()
            && let Err(e) = self.refresh_cart().await
        {
            errors.push((Action::FetchCart, e));
        }

        StartupErrors { errors }
    }

    /// Fetch the full catalog and re-reconcile the cart against it.
    ///
    /// # Errors
    ///
    /// Returns the backend failure; the previous catalog is kept.
    #[instrument(skip(self))]
    pub async fn refresh_catalog(&mut self) -> Result<()> {
        let products = self.api.fetch_products().await?;
        self.catalog = CatalogState::loaded(products);
        self.cart = self.cart.recompute(self.catalog.all());
        Ok(())
    }

    /// Search now, without debouncing, and apply the result.
    ///
    /// # Errors
    ///
    /// Returns the search failure after applying it; see
    /// [`apply_search`](Self::apply_search).
    pub async fn search(&mut self, text: &str) -> Result<()> {
        add_breadcrumb("catalog", "Search", Some(&[("text", text)]));
        let result = self
            .api
            .search_products(text)
            .await
            .map_err(StorefrontError::from);
        self.apply_search(SearchResponse {
            text: text.to_string(),
            result,
        })
    }

    /// Apply a finished search to the catalog.
    ///
    /// # Errors
    ///
    /// Returns the search failure, if any. The catalog has already been
    /// updated by then: `NotFound` switches to the no-results view and any
    /// other failure restores the full catalog.
    pub fn apply_search(&mut self, response: SearchResponse) -> Result<()> {
        self.catalog = self.catalog.after_search(&response.result);
        response.result.map(|products| {
            tracing::debug!(text = %response.text, hits = products.len(), "Search applied");
        })
    }

    /// Debouncer whose responses arrive on `responses`, to be passed to
    /// [`apply_search`](Self::apply_search).
    #[must_use]
    pub fn search_debouncer(&self, responses: mpsc::UnboundedSender<SearchResponse>) -> Debouncer {
        search_debouncer(self.api.clone(), responses)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the cart for the current session.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::AuthRequired` when logged out, or the
    /// backend failure; the previous cart is kept.
    pub async fn refresh_cart(&mut self) -> Result<()> {
        self.cart = CartService::new(&self.api)
            .load(&self.session, self.catalog.all())
            .await?;
        Ok(())
    }

    /// Add one of `product_id` to the cart, refusing products already in it.
    ///
    /// # Errors
    ///
    /// See [`add_or_update`](Self::add_or_update).
    pub async fn add_to_cart(&mut self, product_id: &ProductId) -> Result<()> {
        self.add_or_update(product_id, 1, AddOptions::add()).await
    }

    /// Set the quantity of `product_id`; 0 removes it.
    ///
    /// # Errors
    ///
    /// See [`add_or_update`](Self::add_or_update).
    pub async fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> Result<()> {
        self.add_or_update(product_id, quantity, AddOptions::update())
            .await
    }

    /// Send a cart change and replace the cart with the backend's answer.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::AuthRequired` or
    /// `StorefrontError::DuplicateItem` without contacting the backend, or
    /// the backend failure. The cart is unchanged on any error.
    pub async fn add_or_update(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
        options: AddOptions,
    ) -> Result<()> {
        let qty = quantity.to_string();
        add_breadcrumb(
            "cart",
            "Cart change",
            Some(&[("product_id", product_id.as_str()), ("qty", qty.as_str())]),
        );

        self.cart = CartService::new(&self.api)
            .add_or_update(
                &self.cart,
                &self.session,
                self.catalog.all(),
                product_id,
                quantity,
                options,
            )
            .await?;
        Ok(())
    }

    // =========================================================================
    // Account
    // =========================================================================

    /// Register a new account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns the validation or backend failure.
    pub async fn register(&self, form: &RegistrationForm) -> Result<Notice> {
        add_breadcrumb("auth", "Register", None);
        AuthService::new(&self.api).register(form).await?;
        Ok(Notice::success("Registered successfully"))
    }

    /// Log in, persist the session and make it current.
    ///
    /// The cart is not fetched here; call
    /// [`refresh_cart`](Self::refresh_cart) afterwards.
    ///
    /// # Errors
    ///
    /// Returns the validation or backend failure, or a session store error if
    /// the session could not be persisted. The previous session stays current
    /// on any error.
    pub async fn login(&mut self, form: &LoginForm) -> Result<Notice> {
        add_breadcrumb("auth", "Login", None);
        let outcome = AuthService::new(&self.api).login(form).await?;
        self.store.save(&outcome.session)?;

        if let Some(username) = outcome.session.username() {
            set_sentry_user(username);
            tracing::info!(username = %username, balance = ?outcome.balance, "Logged in");
        }
        self.session = outcome.session;
        Ok(Notice::success("Logged in successfully"))
    }

    /// Forget the session, both in memory and in the store, and empty the
    /// cached cart.
    ///
    /// # Errors
    ///
    /// Returns a session store error if the stored session could not be
    /// removed. The in-memory session is cleared regardless.
    pub fn logout(&mut self) -> Result<()> {
        add_breadcrumb("auth", "Logout", None);
        self.session = Session::anonymous();
        self.cart = CartState::empty();
        clear_sentry_user();
        self.store.clear()?;
        tracing::info!("Logged out");
        Ok(())
    }
}
