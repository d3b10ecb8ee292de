//! Catalog product.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId, Rating};

/// A product available to buy.
///
/// Field names follow the commerce API's wire format:
///
/// ```json
/// {
///     "name": "iPhone XR",
///     "category": "Phones",
///     "cost": 100,
///     "rating": 4,
///     "image": "https://i.imgur.com/lulqWzW.jpg",
///     "_id": "v4sLtEcMpzabRyfx"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub cost: Price,
    pub rating: Rating,
    #[serde(rename = "image")]
    pub image_url: String,
}
