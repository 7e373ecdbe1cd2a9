use serde::Serialize;
use utoipa::ToSchema;

use crate::models::ShopifyProduct;

#[derive(Debug, Serialize, ToSchema)]
pub struct ShopifyProductList {
    pub items: Vec<ShopifyProduct>,
}
