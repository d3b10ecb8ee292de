//! Client-side services.
//!
//! # Services
//!
//! - `auth` - Registration and login, with form validation before any request
//! - `cart` - Cached cart state and the add/update flow
//! - `catalog` - Full and displayed product lists
//! - `search` - Debounced search requests
//!
//! Services borrow a backend implementation and return new state values; the
//! storefront context in [`crate::state`] decides which value is current.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod search;

pub use auth::{AuthService, LoginOutcome};
pub use cart::{AddOptions, CartService, CartState};
pub use catalog::{CatalogState, Listing};
pub use search::{Debouncer, SearchResponse, search_debouncer};
