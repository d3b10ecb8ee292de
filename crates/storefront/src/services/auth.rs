//! Registration and login.
//!
//! Forms are validated locally first; a form that fails validation never
//! reaches the backend. A successful login produces the [`Session`] that the
//! storefront context installs and persists.

use qkart_core::{LoginForm, RegistrationForm};
use tracing::instrument;

use crate::api::AuthBackend;
use crate::error::Result;
use crate::session::Session;

/// Outcome of a successful login.
#[derive(Debug)]
pub struct LoginOutcome {
    pub session: Session,
    /// Wallet balance reported by the backend.
    pub balance: Option<i64>,
}

/// Account operations against an [`AuthBackend`].
pub struct AuthService<'a, B> {
    backend: &'a B,
}

impl<'a, B: AuthBackend> AuthService<'a, B> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Validation` if the form is invalid, or the
    /// backend failure (400 carries the reason, e.g. a taken username).
    #[instrument(skip_all, fields(username = %form.username))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<()> {
        form.validate()?;
        self.backend.register(&form.username, &form.password).await?;
        Ok(())
    }

    /// Log in and build the resulting session.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Validation` if the form is invalid, or the
    /// backend failure (400 carries the reason).
    #[instrument(skip_all, fields(username = %form.username))]
    pub async fn login(&self, form: &LoginForm) -> Result<LoginOutcome> {
        form.validate()?;
        let response = self.backend.login(&form.username, &form.password).await?;

        Ok(LoginOutcome {
            session: Session::authenticated(response.token, response.username),
            balance: response.balance,
        })
    }
}
