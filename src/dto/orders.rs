use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Customer, Order, OrderItem, OrderStatus, Product, ProductVariant, Shipment};

// Serialize is needed so the length validator on `items` can report the
// offending value in its error params.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    #[validate(range(min = 1, message = "Quantity must be at least 1."))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "The customer_name field is required."))]
    pub customer_name: String,
    #[validate(length(min = 1, message = "The customer_address field is required."))]
    pub customer_address: String,
    #[validate(length(min = 1, message = "The customer_city field is required."))]
    pub customer_city: String,
    #[validate(length(min = 1, message = "The customer_phone_number field is required."))]
    pub customer_phone_number: String,
    #[validate(email(message = "A valid customer_email is required."))]
    pub customer_email: String,
    #[validate(length(min = 1, message = "The customer_payment_method field is required."))]
    pub customer_payment_method: String,

    pub delivery_time: Option<DateTime<Utc>>,
    #[schema(value_type = String)]
    pub total_price: Decimal,

    #[validate(length(min = 1, message = "At least one line item is required."))]
    #[validate(nested)]
    pub items: Vec<OrderItemInput>,
}

/// Full replacement: customer fields are upserted, the line item set is
/// deleted and recreated from this payload.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderRequest {
    #[validate(length(min = 1, message = "The customer_name field is required."))]
    pub customer_name: String,
    #[validate(length(min = 1, message = "The customer_address field is required."))]
    pub customer_address: String,
    #[validate(length(min = 1, message = "The customer_city field is required."))]
    pub customer_city: String,
    #[validate(length(min = 1, message = "The customer_phone_number field is required."))]
    pub customer_phone_number: String,
    #[validate(email(message = "A valid customer_email is required."))]
    pub customer_email: String,
    #[validate(length(min = 1, message = "The customer_payment_method field is required."))]
    pub customer_payment_method: String,

    pub delivery_time: Option<DateTime<Utc>>,
    #[schema(value_type = String)]
    pub total_price: Decimal,
    pub status: Option<OrderStatus>,

    #[validate(length(min = 1, message = "At least one line item is required."))]
    #[validate(nested)]
    pub items: Vec<OrderItemInput>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemDetail {
    pub item: OrderItem,
    pub product: Product,
    pub variant: Option<ProductVariant>,
    pub shipment: Option<Shipment>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetail {
    pub order: Order,
    pub customer: Customer,
    pub items: Vec<OrderItemDetail>,
    /// Shipment of the first assigned line item, when any item is assigned.
    pub shipment: Option<Shipment>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::validation_map;
    use rust_decimal_macros::dec;

    fn request(items: Vec<OrderItemInput>) -> CreateOrderRequest {
        CreateOrderRequest {
            customer_name: "Ada".into(),
            customer_address: "1 Main St".into(),
            customer_city: "Berlin".into(),
            customer_phone_number: "+4912345".into(),
            customer_email: "ada@example.com".into(),
            customer_payment_method: "card".into(),
            delivery_time: None,
            total_price: dec!(10),
            items,
        }
    }

    #[test]
    fn empty_item_set_is_rejected() {
        let errors = request(Vec::new()).validate().unwrap_err();
        let map = validation_map(&errors);
        assert!(map.contains_key("items"));
    }

    #[test]
    fn zero_quantity_is_reported_per_item() {
        let items = vec![OrderItemInput {
            product_id: Uuid::new_v4(),
            variant_id: None,
            quantity: 0,
        }];
        let errors = request(items).validate().unwrap_err();
        let map = validation_map(&errors);
        assert!(map.contains_key("items.0.quantity"));
    }
}
