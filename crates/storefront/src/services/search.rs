//! Debounced search.
//!
//! Typing into the search bar should not fire one request per keystroke.
//! [`Debouncer`] holds at most one pending timer: every call cancels the
//! timer scheduled by the previous call and starts a new one. Only a timer
//! that survives a full quiet period fires, with the text it was given.
//!
//! Cancellation only reaches timers that have not fired yet. Once a search
//! request is on the wire it runs to completion and its result is delivered,
//! even if the user has typed more in the meantime.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use qkart_core::Product;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::api::CatalogBackend;
use crate::error::StorefrontError;

type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type Action = Arc<dyn Fn(String) -> BoxFuture + Send + Sync>;

/// Runs an action once input has been quiet for the requested delay.
///
/// Timers run on the ambient tokio runtime, so [`Debouncer::call`] must be
/// made from within one. Dropping the debouncer cancels the pending timer.
pub struct Debouncer {
    action: Action,
    pending: Option<CancellationToken>,
}

impl Debouncer {
    /// Create a debouncer that runs `action` with the latest text.
    pub fn new<F, Fut>(action: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            action: Arc::new(move |text: String| Box::pin(action(text)) as BoxFuture),
            pending: None,
        }
    }

    /// Schedule the action for `text` after `delay`, discarding whatever was
    /// scheduled before and has not fired yet.
    pub fn call(&mut self, text: impl Into<String>, delay: Duration) {
        self.cancel();

        let token = CancellationToken::new();
        self.pending = Some(token.clone());

        let action = Arc::clone(&self.action);
        let text = text.into();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {
                    tracing::trace!("Debounced call superseded");
                }
                () = tokio::time::sleep(delay) => {
                    action(text).await;
                }
            }
        });
    }

    /// Cancel the pending timer, if any.
    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A finished debounced search.
#[derive(Debug)]
pub struct SearchResponse {
    /// The text that was searched for.
    pub text: String,
    pub result: Result<Vec<Product>, StorefrontError>,
}

/// Debouncer that searches `backend` and sends each response to `responses`.
///
/// Responses are delivered in completion order; the receiver applies them to
/// the catalog state.
pub fn search_debouncer<B>(backend: B, responses: mpsc::UnboundedSender<SearchResponse>) -> Debouncer
where
    B: CatalogBackend + Clone + 'static,
{
    Debouncer::new(move |text: String| {
        let backend = backend.clone();
        let responses = responses.clone();
        async move {
            tracing::debug!(text = %text, "Sending debounced search");
            let result = backend
                .search_products(&text)
                .await
                .map_err(StorefrontError::from);
            // The receiver is gone when the view has been torn down
            let _ = responses.send(SearchResponse { text, result });
        }
    })
}
