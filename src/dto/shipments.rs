use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Order, OrderItem, Product, ProductVariant, Shipment};

/// Create and update take the same shape; the item set always fully replaces
/// the previous assignment.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ShipmentPayload {
    #[validate(length(min = 1, message = "The brand field is required."))]
    pub brand: String,
    pub quantity: i32,
    pub description: Option<String>,
    pub arriving_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = String)]
    pub total_price_variant: Decimal,
    #[validate(length(min = 1, message = "At least one order item is required."))]
    pub order_item_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShipmentItemDetail {
    pub item: OrderItem,
    pub order: Option<Order>,
    pub product: Option<Product>,
    pub variant: Option<ProductVariant>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShipmentDetail {
    pub shipment: Shipment,
    pub items: Vec<ShipmentItemDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShipmentList {
    pub items: Vec<ShipmentDetail>,
}

/// Mutation responses echo which orders were touched.
#[derive(Debug, Serialize, ToSchema)]
pub struct ShipmentWithOrders {
    pub shipment: Shipment,
    pub order_ids: Vec<Uuid>,
}
