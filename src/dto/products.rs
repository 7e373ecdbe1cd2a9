use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Product, ProductImage, ProductVariant};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VariantInput {
    pub name: Option<String>,
    pub sku: Option<String>,
    #[schema(value_type = Option<String>)]
    pub product_price: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub product_cost: Option<Decimal>,
    pub stock: Option<i32>,
    pub attributes: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "The name field is required."))]
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    /// Remote URLs or `data:image/<ext>;base64,<payload>` data URIs; the
    /// first entry becomes the main image.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub variants: Vec<VariantInput>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    /// When present, replaces the whole image set.
    pub images: Option<Vec<String>>,
    /// When present, replaces the whole variant set.
    #[validate(nested)]
    pub variants: Option<Vec<VariantInput>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub product: Product,
    pub variants: Vec<ProductVariant>,
    pub images: Vec<ProductImage>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<ProductDetail>,
}
