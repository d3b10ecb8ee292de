//! QKart Core - Shared types library.
//!
//! This crate provides the types and pure logic used across all QKart
//! components:
//! - `storefront` - API client, session handling and client-side state
//! - `cli` - Terminal front end for browsing, searching and the cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows the cart and form logic to be
//! tested without a backend.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, ratings and form input
//! - [`product`] - Catalog product
//! - [`cart`] - Cart entries, line items and the cart reconciler

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod product;
pub mod types;

pub use cart::{CartEntry, CartLineItem, CartLineItems, position_in_cart, reconcile};
pub use product::Product;
pub use types::*;
