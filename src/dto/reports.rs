use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_orders: i64,
    pub total_shipments: i64,
    pub total_products: i64,
    #[schema(value_type = String)]
    pub total_selling_price: Decimal,
    #[schema(value_type = String)]
    pub total_cost_price: Decimal,
    #[schema(value_type = String)]
    pub gross_profit: Decimal,
    #[schema(value_type = String)]
    pub total_shipment_charges: Decimal,
    #[schema(value_type = String)]
    pub net_profit: Decimal,
    pub date_range: DateRange,
}
