//! QKart storefront client library.
//!
//! Talks to the QKart commerce API and keeps the client-side state a front
//! end renders: the catalog, search results, the cart and the logged-in
//! session.
//!
//! # Modules
//!
//! - [`api`] - HTTP client for the commerce API and the backend traits
//! - [`config`] - Configuration from environment variables
//! - [`error`] - Error taxonomy, user-facing notices and Sentry reporting
//! - [`services`] - Catalog, search, cart and account flows
//! - [`session`] - Session value and its persistence
//! - [`state`] - The [`Storefront`] context that ties it all together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod session;
pub mod state;

pub use config::StorefrontConfig;
pub use error::{Action, Notice, NoticeLevel, Result, StorefrontError, report};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
pub use state::{StartupErrors, Storefront};
