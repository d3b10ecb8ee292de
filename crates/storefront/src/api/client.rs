//! HTTP plumbing shared by every endpoint.

use std::sync::Arc;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::ApiError;
use crate::config::StorefrontConfig;

/// Longest slice of an error body that ends up in logs.
const LOGGED_BODY_LIMIT: usize = 500;

/// Client for the QKart commerce API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

/// Error body the backend sends with non-success responses:
/// `{ "success": false, "message": "..." }`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("qkart/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
            }),
        })
    }

    pub(super) fn http(&self) -> &reqwest::Client {
        &self.inner.client
    }

    /// Resolve an endpoint path (no leading slash) against the base URL.
    pub(super) fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Send a request and decode a JSON success body.
    pub(super) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        Ok(response.json::<T>().await?)
    }

    /// Send a request, turning non-success statuses into errors.
    pub(super) async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Body read failures only cost us the message
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body, status);

        if status == StatusCode::NOT_FOUND {
            tracing::debug!(status = %status, message = %message, "API returned not found");
            return Err(ApiError::NotFound(message));
        }

        tracing::warn!(
            status = %status,
            body = %body.chars().take(LOGGED_BODY_LIMIT).collect::<String>(),
            "API returned non-success status"
        );
        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// The backend's `message` field, or the status reason when there is none.
fn error_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_body() {
        let body = r#"{"success":false,"message":"Product doesn't exist"}"#;
        assert_eq!(
            error_message(body, StatusCode::NOT_FOUND),
            "Product doesn't exist"
        );
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(
            error_message("<html>oops</html>", StatusCode::INTERNAL_SERVER_ERROR),
            "Internal Server Error"
        );
        assert_eq!(
            error_message(r#"{"success":false}"#, StatusCode::BAD_REQUEST),
            "Bad Request"
        );
        assert_eq!(
            error_message(r#"{"message":"  "}"#, StatusCode::BAD_REQUEST),
            "Bad Request"
        );
    }
}
