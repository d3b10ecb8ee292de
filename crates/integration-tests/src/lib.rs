//! Integration test support for the QKart storefront client.
//!
//! [`MockBackend`] is an in-process stand-in for the QKart commerce API. It
//! serves the same routes, status codes and JSON shapes as the real backend
//! from an `axum` router bound to an ephemeral port, so the client is
//! exercised over real HTTP. Every request is counted per route, which lets
//! tests assert that a refused action never reached the network.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p qkart-integration-tests
//! ```
//!
//! No external services are needed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use qkart_storefront::StorefrontConfig;
use serde::Deserialize;
use serde_json::{Value, json};

/// Path prefix the mock serves the API under.
const API_PREFIX: &str = "/api/v1";

/// Route keys accepted by [`MockBackend::hits`].
pub mod routes {
    pub const PRODUCTS: &str = "GET /products";
    pub const SEARCH: &str = "GET /products/search";
    pub const GET_CART: &str = "GET /cart";
    pub const POST_CART: &str = "POST /cart";
    pub const REGISTER: &str = "POST /auth/register";
    pub const LOGIN: &str = "POST /auth/login";
}

/// Catalog served by every mock backend.
#[must_use]
pub fn sample_products() -> Vec<Value> {
    vec![
        json!({
            "name": "UNIFACTOR Mens Running Shoes",
            "category": "Fashion",
            "cost": 50,
            "rating": 5,
            "image": "https://crio-directus-assets.s3.ap-south-1.amazonaws.com/42d4d057-8704-4174-8d74-e5e9052677c6.png",
            "_id": "BW0jAAeDJmlZCF8i"
        }),
        json!({
            "name": "YONEX Smash Badminton Racquet",
            "category": "Sports",
            "cost": 100,
            "rating": 5,
            "image": "https://crio-directus-assets.s3.ap-south-1.amazonaws.com/64b930f7-3c82-4a29-a433-dbc6f1493578.png",
            "_id": "KCRwjF7lN97HnEaY"
        }),
        json!({
            "name": "Tan Leatherette Weekender Duffle",
            "category": "Fashion",
            "cost": 150,
            "rating": 4,
            "image": "https://crio-directus-assets.s3.ap-south-1.amazonaws.com/ff071a1c-1099-48f9-9b03-f858ccc53832.png",
            "_id": "PmInA797xJhMIPti"
        }),
        json!({
            "name": "The Minimalist Slim Leather Watch",
            "category": "Electronics",
            "cost": 60,
            "rating": 5,
            "image": "https://crio-directus-assets.s3.ap-south-1.amazonaws.com/5b478a4a-bf81-467c-964c-6881887799b4.png",
            "_id": "TwMM4OAhmK0VQ93S"
        }),
        json!({
            "name": "Atomberg 1200mm BLDC motor",
            "category": "Home & Kitchen",
            "cost": 130,
            "rating": 4,
            "image": "https://crio-directus-assets.s3.ap-south-1.amazonaws.com/e8c2ad5b-a5b3-4a4e-9b3e-2a3c6e3a8f5b.png",
            "_id": "a4sLtEcMpzabRyfx"
        }),
    ]
}

#[derive(Default)]
struct MockState {
    products: Vec<Value>,
    /// username -> password
    users: Mutex<HashMap<String, String>>,
    /// token -> cart entries as (productId, qty)
    carts: Mutex<HashMap<String, Vec<(String, u32)>>>,
    hits: Mutex<HashMap<&'static str, usize>>,
    products_status: Mutex<Option<u16>>,
    search_status: Mutex<Option<u16>>,
    search_garbled: Mutex<bool>,
}

impl MockState {
    fn hit(&self, route: &'static str) {
        *self
            .hits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(route)
            .or_default() += 1;
    }

    fn token_for(username: &str) -> String {
        format!("token-{username}")
    }

    /// The cart key for a request's bearer token, if it belongs to a user.
    fn authorize(&self, headers: &HeaderMap) -> Option<String> {
        let token = headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        users
            .keys()
            .any(|username| Self::token_for(username) == token)
            .then(|| token.to_string())
    }

    fn has_product(&self, id: &str) -> bool {
        self.products.iter().any(|p| p["_id"] == id)
    }

    fn cart_json(entries: &[(String, u32)]) -> Value {
        Value::Array(
            entries
                .iter()
                .map(|(id, qty)| json!({"productId": id, "qty": qty}))
                .collect(),
        )
    }
}

/// An in-process QKart commerce API.
///
/// The server task is aborted when the backend is dropped.
pub struct MockBackend {
    base_url: String,
    state: Arc<MockState>,
    handle: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend serving [`sample_products`] on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState {
            products: sample_products(),
            ..MockState::default()
        });

        let app = Router::new()
            .route(&format!("{API_PREFIX}/products"), get(list_products))
            .route(&format!("{API_PREFIX}/products/search"), get(search_products))
            .route(
                &format!("{API_PREFIX}/cart"),
                get(get_cart).post(update_cart),
            )
            .route(&format!("{API_PREFIX}/auth/register"), post(register))
            .route(&format!("{API_PREFIX}/auth/login"), post(login))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().expect("listener has no local address");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                panic!("mock backend stopped: {e}");
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            handle,
        }
    }

    /// The API base URL, as it would appear in `QKART_API_URL`.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("{}{API_PREFIX}", self.base_url)
    }

    /// Client configuration pointing at this backend, with a short search
    /// delay so debounce tests stay fast.
    ///
    /// # Panics
    ///
    /// Panics if the backend URL is rejected, which would be a bug here.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        let mut config =
            StorefrontConfig::new(&self.api_url()).expect("mock backend URL is valid");
        config.search_debounce = Duration::from_millis(100);
        config.http_timeout = Duration::from_secs(5);
        config
    }

    /// Number of requests served for `route` (see [`routes`]).
    #[must_use]
    pub fn hits(&self, route: &str) -> usize {
        self.state
            .hits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(route)
            .copied()
            .unwrap_or(0)
    }

    /// Create an account directly, bypassing `/auth/register`.
    pub fn add_user(&self, username: &str, password: &str) {
        self.state
            .users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(username.to_string(), password.to_string());
    }

    /// Make `GET /products` answer `status` from now on.
    pub fn fail_products_with(&self, status: u16) {
        *self
            .state
            .products_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(status);
    }

    /// Make `GET /products/search` answer `status` from now on.
    pub fn fail_search_with(&self, status: u16) {
        *self
            .state
            .search_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(status);
    }

    /// Make `GET /products/search` answer 200 with a body that is not JSON,
    /// as a misconfigured proxy in front of the API would.
    pub fn garble_search(&self) {
        *self
            .state
            .search_garbled
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = true;
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn failure(status: u16, message: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({"success": false, "message": message}))).into_response()
}

async fn list_products(State(state): State<Arc<MockState>>) -> Response {
    state.hit(routes::PRODUCTS);

    let forced = *state
        .products_status
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(status) = forced {
        return failure(
            status,
            "Something went wrong. Check the backend console for more details",
        );
    }
    Json(Value::Array(state.products.clone())).into_response()
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    value: String,
}

async fn search_products(
    State(state): State<Arc<MockState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    state.hit(routes::SEARCH);

    let forced = *state
        .search_status
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(status) = forced {
        return failure(status, "Search is down");
    }
    if *state
        .search_garbled
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
    {
        return (
            [(header::CONTENT_TYPE, "text/html")],
            "<html><body>Bad Gateway</body></html>",
        )
            .into_response();
    }

    let needle = params.value.to_lowercase();
    let hits: Vec<Value> = state
        .products
        .iter()
        .filter(|p| {
            ["name", "category"].iter().any(|field| {
                p[*field]
                    .as_str()
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
            })
        })
        .cloned()
        .collect();

    if hits.is_empty() {
        return failure(404, "No products found");
    }
    Json(Value::Array(hits)).into_response()
}

async fn get_cart(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.hit(routes::GET_CART);

    let Some(token) = state.authorize(&headers) else {
        return failure(401, "Protected route, Oauth2 Bearer token not found");
    };
    let carts = state.carts.lock().unwrap_or_else(PoisonError::into_inner);
    let entries = carts.get(&token).map(Vec::as_slice).unwrap_or_default();
    Json(MockState::cart_json(entries)).into_response()
}

#[derive(Deserialize)]
struct CartUpdate {
    #[serde(rename = "productId")]
    product_id: String,
    qty: u32,
}

async fn update_cart(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(update): Json<CartUpdate>,
) -> Response {
    state.hit(routes::POST_CART);

    let Some(token) = state.authorize(&headers) else {
        return failure(401, "Protected route, Oauth2 Bearer token not found");
    };
    if !state.has_product(&update.product_id) {
        return failure(404, "Product doesn't exist");
    }

    let mut carts = state.carts.lock().unwrap_or_else(PoisonError::into_inner);
    let entries = carts.entry(token).or_default();
    match entries.iter().position(|(id, _)| *id == update.product_id) {
        Some(i) if update.qty == 0 => {
            entries.remove(i);
        }
        Some(i) => {
            if let Some(entry) = entries.get_mut(i) {
                entry.1 = update.qty;
            }
        }
        None if update.qty > 0 => entries.push((update.product_id, update.qty)),
        None => {}
    }
    Json(MockState::cart_json(entries)).into_response()
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn register(
    State(state): State<Arc<MockState>>,
    Json(credentials): Json<Credentials>,
) -> Response {
    state.hit(routes::REGISTER);

    let mut users = state.users.lock().unwrap_or_else(PoisonError::into_inner);
    if users.contains_key(&credentials.username) {
        return failure(400, "Username is already taken");
    }
    users.insert(credentials.username, credentials.password);
    (StatusCode::CREATED, Json(json!({"success": true}))).into_response()
}

async fn login(
    State(state): State<Arc<MockState>>,
    Json(credentials): Json<Credentials>,
) -> Response {
    state.hit(routes::LOGIN);

    let users = state.users.lock().unwrap_or_else(PoisonError::into_inner);
    match users.get(&credentials.username) {
        None => failure(400, "Username does not exist"),
        Some(password) if *password != credentials.password => {
            failure(400, "Password is incorrect")
        }
        Some(_) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "token": MockState::token_for(&credentials.username),
                "username": credentials.username,
                "balance": 5000
            })),
        )
            .into_response(),
    }
}
