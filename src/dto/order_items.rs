use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

/// A line item not yet assigned to any shipment, as offered to the shipment
/// planning screen.
#[derive(Debug, Serialize, ToSchema)]
pub struct UnassignedOrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub quantity: i32,
    pub product: Product,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UnassignedOrderItemList {
    pub items: Vec<UnassignedOrderItem>,
}
