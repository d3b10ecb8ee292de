//! Unified error handling with Sentry integration.
//!
//! Every storefront operation returns `Result<T, StorefrontError>`. The front
//! end turns a failure into a user-facing [`Notice`] with [`report`], which
//! also captures server and network failures to Sentry before anything is
//! shown to the user.
//!
//! Nothing here is fatal: after any error the caller is free to try again.

use core::fmt;

use qkart_core::{ProductId, ValidationError};
use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::session::SessionStoreError;

/// Shown when the backend could not be reached or sent garbage.
const BACKEND_HINT: &str =
    "Check that the backend is running, reachable and returns valid JSON";

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Form input rejected before any request was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The operation needs a logged-in session.
    #[error("Login to add an item to the Cart")]
    AuthRequired,

    /// The product is already in the cart and duplicates were refused.
    #[error("Item already in cart. Use the cart sidebar to update quantity or remove item.")]
    DuplicateItem(ProductId),

    /// The backend answered 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend answered with a non-success status.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// No usable response from the backend.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The persisted session could not be read or written.
    #[error("Session store error: {0}")]
    Session(#[from] SessionStoreError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<ApiError> for StorefrontError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Http(e) => Self::Network(e),
            ApiError::NotFound(message) => Self::NotFound(message),
            ApiError::Api { status, message } => Self::Server { status, message },
            ApiError::Url(e) => Self::Config(ConfigError::InvalidEnvVar(
                crate::config::API_URL_VAR.to_string(),
                e.to_string(),
            )),
        }
    }
}

impl StorefrontError {
    /// Whether the failure happened before any request left the client.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::AuthRequired | Self::DuplicateItem(_) | Self::Config(_)
        )
    }

    /// Whether the error is worth an error report (as opposed to a user mistake).
    const fn is_reportable(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::Network(_) | Self::Session(_))
    }

    /// The message the backend sent along with the failure, if any.
    fn backend_message(&self) -> Option<&str> {
        match self {
            Self::NotFound(message) | Self::Server { message, .. } => Some(message),
            _ => None,
        }
    }

    /// User-facing notice for this error in the context of `action`.
    ///
    /// Returns `None` when the front end shows the outcome some other way:
    /// a search without matches switches the catalog to its "No products
    /// found" view instead of raising a notification.
    #[must_use]
    pub fn notice(&self, action: Action) -> Option<Notice> {
        if self.is_local() {
            return Some(Notice::warning(self.to_string()));
        }

        let message = match (action, self) {
            (Action::Search, Self::NotFound(_)) => return None,
            (Action::Search, _) => action.fallback_message(),

            // Any answer from the backend carries a message worth showing
            (Action::FetchProducts | Action::UpdateCart, err) => err
                .backend_message()
                .map_or_else(|| action.fallback_message(), str::to_string),

            // Only 400 responses carry a message meant for the user
            (
                Action::FetchCart | Action::Register | Action::Login,
                Self::Server {
                    status: 400,
                    message,
                },
            ) => message.clone(),

            (_, Self::Session(_)) => self.to_string(),
            _ => action.fallback_message(),
        };

        Some(Notice::error(message))
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// The user action that failed, used to pick the right wording for a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    FetchProducts,
    Search,
    FetchCart,
    UpdateCart,
    Register,
    Login,
    Logout,
}

impl Action {
    const fn name(self) -> &'static str {
        match self {
            Self::FetchProducts => "fetch_products",
            Self::Search => "search",
            Self::FetchCart => "fetch_cart",
            Self::UpdateCart => "update_cart",
            Self::Register => "register",
            Self::Login => "login",
            Self::Logout => "logout",
        }
    }

    fn fallback_message(self) -> String {
        match self {
            Self::FetchProducts | Self::Search => format!("Could not fetch products. {BACKEND_HINT}"),
            Self::FetchCart => format!("Could not fetch cart details. {BACKEND_HINT}."),
            Self::UpdateCart => format!("Could not update the cart. {BACKEND_HINT}."),
            Self::Register | Self::Login | Self::Logout => {
                format!("Something went wrong. {BACKEND_HINT}")
            }
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Report a failed action and produce the notice to show for it.
///
/// Server, network and session-store failures are captured to Sentry and
/// logged at error level; user mistakes (validation, missing login,
/// duplicates) are logged at debug level only.
pub fn report(action: Action, err: &StorefrontError) -> Option<Notice> {
    if err.is_reportable() {
        let event_id = sentry::capture_error(err);
        tracing::error!(
            action = %action,
            error = %err,
            sentry_event_id = %event_id,
            "Storefront action failed"
        );
    } else {
        tracing::debug!(action = %action, error = %err, "Storefront action refused");
    }

    err.notice(action)
}

/// Set the Sentry user context.
///
/// Call this after a successful login to associate errors with users.
pub fn set_sentry_user(username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product", Some(&[("product_id", "v4sLtEcMpzabRyfx")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
