//! QKart commerce API client.
//!
//! # Architecture
//!
//! - Plain REST + JSON over `reqwest`
//! - The backend is the source of truth for products and carts; nothing is
//!   cached between calls
//! - No retries: a failed call is reported and has to be triggered again
//!
//! # Endpoints
//!
//! | Operation | Request |
//! |---|---|
//! | List products | `GET /products` |
//! | Search products | `GET /products/search?value=TEXT` |
//! | Get cart | `GET /cart` (Bearer token) |
//! | Add/update cart item | `POST /cart {productId, qty}` (Bearer token) |
//! | Register | `POST /auth/register {username, password}` |
//! | Login | `POST /auth/login {username, password}` |
//!
//! The services in [`crate::services`] talk to the backend through the
//! [`CatalogBackend`], [`CartBackend`] and [`AuthBackend`] traits, which
//! [`ApiClient`] implements.

mod auth;
mod cart;
mod catalog;
mod client;

pub use auth::LoginResponse;
pub use client::ApiClient;

use std::future::Future;

use qkart_core::{CartEntry, Product, ProductId};
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur when calling the commerce API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No usable response: connection failure, timeout, or a body that is
    /// not the JSON the endpoint promises.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend answered with any other non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// An endpoint URL could not be built from the configured base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status reported by the backend, if it answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::Api { status, .. } => Some(*status),
            Self::Http(_) | Self::Url(_) => None,
        }
    }
}

/// Product catalog endpoints.
pub trait CatalogBackend: Send + Sync {
    /// Fetch the full catalog.
    fn fetch_products(&self) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    /// Search the catalog. A search without matches is `ApiError::NotFound`.
    fn search_products(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;
}

/// Cart endpoints. Every call needs the session's bearer token.
pub trait CartBackend: Send + Sync {
    /// Fetch the cart entries.
    fn fetch_cart(
        &self,
        token: &SecretString,
    ) -> impl Future<Output = Result<Vec<CartEntry>, ApiError>> + Send;

    /// Set the quantity of `product_id` and return the full updated cart.
    fn update_cart(
        &self,
        token: &SecretString,
        product_id: &ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<Vec<CartEntry>, ApiError>> + Send;
}

/// Account endpoints.
pub trait AuthBackend: Send + Sync {
    /// Create an account.
    fn register(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Exchange credentials for a session token.
    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send;
}
