//! Product endpoints.

use qkart_core::Product;
use tracing::instrument;

use super::{ApiClient, ApiError, CatalogBackend};

impl CatalogBackend for ApiClient {
    #[instrument(skip(self))]
    async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
        let url = self.endpoint("products")?;
        let products: Vec<Product> = self.send_json(self.http().get(url)).await?;

        tracing::debug!(count = products.len(), "Fetched catalog");
        Ok(products)
    }

    #[instrument(skip(self), fields(text = %text))]
    async fn search_products(&self, text: &str) -> Result<Vec<Product>, ApiError> {
        let url = self.endpoint("products/search")?;
        let request = self.http().get(url).query(&[("value", text)]);
        let products: Vec<Product> = self.send_json(request).await?;

        tracing::debug!(count = products.len(), "Search returned products");
        Ok(products)
    }
}
