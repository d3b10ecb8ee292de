//! Core types for QKart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod credential;
pub mod id;
pub mod price;
pub mod rating;

pub use credential::{LoginForm, MIN_CREDENTIAL_LENGTH, RegistrationForm, ValidationError};
pub use id::*;
pub use price::Price;
pub use rating::{Rating, RatingError};
