//! Cart endpoints.

use qkart_core::{CartEntry, ProductId};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::instrument;

use super::{ApiClient, ApiError, CartBackend};

/// Body of `POST /cart`.
#[derive(Debug, Serialize)]
struct CartUpdate<'a> {
    #[serde(rename = "productId")]
    product_id: &'a ProductId,
    qty: u32,
}

impl CartBackend for ApiClient {
    #[instrument(skip_all)]
    async fn fetch_cart(&self, token: &SecretString) -> Result<Vec<CartEntry>, ApiError> {
        let url = self.endpoint("cart")?;
        let request = self.http().get(url).bearer_auth(token.expose_secret());
        let entries: Vec<CartEntry> = self.send_json(request).await?;

        tracing::debug!(count = entries.len(), "Fetched cart");
        Ok(entries)
    }

    #[instrument(skip(self, token), fields(product_id = %product_id))]
    async fn update_cart(
        &self,
        token: &SecretString,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Vec<CartEntry>, ApiError> {
        let url = self.endpoint("cart")?;
        let request = self
            .http()
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(&CartUpdate {
                product_id,
                qty: quantity,
            });
        let entries: Vec<CartEntry> = self.send_json(request).await?;

        tracing::debug!(count = entries.len(), "Cart updated");
        Ok(entries)
    }
}
