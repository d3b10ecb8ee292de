//! Subcommand implementations.
//!
//! Commands run storefront operations and print their outcome. A failure is
//! tagged with the [`Action`] it interrupted so `main` can pick the right
//! notice for it.

pub mod account;
pub mod cart;
pub mod catalog;

use qkart_storefront::{Action, StorefrontError, report};
use thiserror::Error;

use crate::output;

/// A storefront operation failed while running a command.
#[derive(Debug, Error)]
#[error("{action} failed: {source}")]
pub struct CommandError {
    pub action: Action,
    #[source]
    pub source: StorefrontError,
}

/// Tag a storefront result with the action it belongs to.
pub trait During<T> {
    /// # Errors
    ///
    /// Returns the wrapped error tagged with `action`.
    fn during(self, action: Action) -> Result<T, CommandError>;
}

impl<T> During<T> for Result<T, StorefrontError> {
    fn during(self, action: Action) -> Result<T, CommandError> {
        self.map_err(|source| CommandError { action, source })
    }
}

/// Report a failure that does not end the command.
fn show_notice(action: Action, err: &StorefrontError) {
    if let Some(notice) = report(action, err) {
        output::notice(&notice);
    }
}
