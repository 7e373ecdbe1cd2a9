use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity;

/// Order lifecycle. Assignment to a shipment moves Pending -> In Progress;
/// Completed and Cancelled are only reached through explicit status updates,
/// and shipment deletion reverts affected orders to Pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum OrderStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Cancelled,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::InProgress => "In Progress",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "In Progress" => Ok(OrderStatus::InProgress),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            "Completed" => Ok(OrderStatus::Completed),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone_number: String,
    pub email: String,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub shopify_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductVariant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: Option<String>,
    pub sku: Option<String>,
    #[schema(value_type = Option<String>)]
    pub product_price: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub product_cost: Option<Decimal>,
    pub stock: i32,
    pub attributes: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_variant_id: Option<Uuid>,
    pub image_path: String,
    pub is_main: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub delivery_time: Option<DateTime<Utc>>,
    #[schema(value_type = String)]
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub shipment_id: Option<Uuid>,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Shipment {
    pub id: Uuid,
    pub brand: String,
    pub quantity: i32,
    pub description: Option<String>,
    pub arriving_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = String)]
    pub total_price_variant: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShopifyProduct {
    pub id: Uuid,
    pub shopify_id: i64,
    pub title: String,
    pub body_html: Option<String>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub handle: Option<String>,
    pub images: Option<serde_json::Value>,
    pub variants: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<entity::users::Model> for User {
    fn from(model: entity::users::Model) -> Self {
        User {
            id: model.id,
            email: model.email,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::customers::Model> for Customer {
    fn from(model: entity::customers::Model) -> Self {
        Customer {
            id: model.id,
            name: model.name,
            address: model.address,
            city: model.city,
            phone_number: model.phone_number,
            email: model.email,
            payment_method: model.payment_method,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::products::Model> for Product {
    fn from(model: entity::products::Model) -> Self {
        Product {
            id: model.id,
            shopify_id: model.shopify_id,
            name: model.name,
            description: model.description,
            brand: model.brand,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::product_variants::Model> for ProductVariant {
    fn from(model: entity::product_variants::Model) -> Self {
        ProductVariant {
            id: model.id,
            product_id: model.product_id,
            name: model.name,
            sku: model.sku,
            product_price: model.product_price,
            product_cost: model.product_cost,
            stock: model.stock,
            attributes: model.attributes,
        }
    }
}

impl From<entity::product_images::Model> for ProductImage {
    fn from(model: entity::product_images::Model) -> Self {
        ProductImage {
            id: model.id,
            product_id: model.product_id,
            product_variant_id: model.product_variant_id,
            image_path: model.image_path,
            is_main: model.is_main,
        }
    }
}

impl From<entity::orders::Model> for Order {
    fn from(model: entity::orders::Model) -> Self {
        Order {
            id: model.id,
            customer_id: model.customer_id,
            delivery_time: model.delivery_time.map(|dt| dt.with_timezone(&Utc)),
            total_price: model.total_price,
            // Rows only ever hold strings written from OrderStatus::as_str.
            status: model.status.parse().unwrap_or(OrderStatus::Pending),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::order_items::Model> for OrderItem {
    fn from(model: entity::order_items::Model) -> Self {
        OrderItem {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            variant_id: model.variant_id,
            shipment_id: model.shipment_id,
            quantity: model.quantity,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::shipments::Model> for Shipment {
    fn from(model: entity::shipments::Model) -> Self {
        Shipment {
            id: model.id,
            brand: model.brand,
            quantity: model.quantity,
            description: model.description,
            arriving_at: model.arriving_at.with_timezone(&Utc),
            price: model.price,
            total_price_variant: model.total_price_variant,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::shopify_products::Model> for ShopifyProduct {
    fn from(model: entity::shopify_products::Model) -> Self {
        ShopifyProduct {
            id: model.id,
            shopify_id: model.shopify_id,
            title: model.title,
            body_html: model.body_html,
            vendor: model.vendor,
            product_type: model.product_type,
            handle: model.handle,
            images: model.images,
            variants: model.variants,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::InProgress,
            OrderStatus::Cancelled,
            OrderStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn in_progress_uses_spaced_form() {
        assert_eq!(OrderStatus::InProgress.as_str(), "In Progress");
        assert!("InProgress".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn status_serializes_like_the_stored_string() {
        let json = serde_json::to_string(&OrderStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
    }
}
