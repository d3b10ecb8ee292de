//! Account endpoints.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::instrument;

use super::{ApiClient, ApiError, AuthBackend};

/// Body of `POST /auth/register` and `POST /auth/login`.
#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

/// Successful login response.
///
/// ```json
/// { "success": true, "token": "eyJhbGciOi...", "username": "crio.do", "balance": 5000 }
/// ```
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(deserialize_with = "deserialize_secret")]
    pub token: SecretString,
    pub username: String,
    #[serde(default)]
    pub balance: Option<i64>,
}

fn deserialize_secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

impl AuthBackend for ApiClient {
    #[instrument(skip(self, password))]
    async fn register(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let url = self.endpoint("auth/register")?;
        let request = self
            .http()
            .post(url)
            .json(&Credentials { username, password });
        self.send(request).await?;

        tracing::info!("Account registered");
        Ok(())
    }

    #[instrument(skip(self, password))]
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint("auth/login")?;
        let request = self
            .http()
            .post(url)
            .json(&Credentials { username, password });
        let response: LoginResponse = self.send_json(request).await?;

        tracing::info!("Logged in");
        Ok(response)
    }
}
