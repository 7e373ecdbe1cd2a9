use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, FromQueryResult, JoinType, QueryFilter, QuerySelect,
    RelationTrait,
};
use uuid::Uuid;

use crate::{
    dto::reports::{DashboardStats, DateRange},
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        order_items, orders, product_variants, shipments,
    },
    error::AppResult,
    response::{ApiResponse, Meta},
    routes::params::DashboardQuery,
    state::AppState,
};

/// One shipped line item with everything the profit fold needs. Variant
/// prices are optional because an item may reference no variant.
#[derive(Debug, FromQueryResult)]
pub struct ShippedItemRow {
    pub order_id: Uuid,
    pub shipment_id: Uuid,
    pub quantity: i32,
    pub product_price: Option<Decimal>,
    pub product_cost: Option<Decimal>,
    pub shipment_charge: Decimal,
}

pub async fn dashboard_stats(
    state: &AppState,
    query: DashboardQuery,
) -> AppResult<ApiResponse<DashboardStats>> {
    let window = parse_window(query.start_date, query.end_date);

    let mut condition = Condition::all()
        .add(OrderItemCol::ShipmentId.is_not_null())
        .add(orders::Column::DeletedAt.is_null())
        .add(shipments::Column::DeletedAt.is_null());
    if let Some((start, end)) = window {
        condition = condition.add(orders::Column::CreatedAt.between(start, end));
    }

    let rows = OrderItems::find()
        .join(JoinType::InnerJoin, order_items::Relation::Orders.def())
        .join(JoinType::InnerJoin, order_items::Relation::Shipments.def())
        .join(
            JoinType::LeftJoin,
            order_items::Relation::ProductVariants.def(),
        )
        .filter(condition)
        .select_only()
        .column_as(OrderItemCol::OrderId, "order_id")
        .column_as(OrderItemCol::ShipmentId, "shipment_id")
        .column_as(OrderItemCol::Quantity, "quantity")
        .column_as(product_variants::Column::ProductPrice, "product_price")
        .column_as(product_variants::Column::ProductCost, "product_cost")
        .column_as(shipments::Column::Price, "shipment_charge")
        .into_model::<ShippedItemRow>()
        .all(&state.orm)
        .await?;

    let stats = fold_stats(&rows, window);
    Ok(ApiResponse::success(
        "Dashboard stats",
        stats,
        Some(Meta::empty()),
    ))
}

/// Inclusive day bounds: start of `start_date` through end of `end_date`.
/// Both dates must be present for the window to apply.
fn parse_window(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let (start, end) = (start_date?, end_date?);
    let start = start.and_hms_opt(0, 0, 0)?.and_utc();
    let end = end.and_hms_micro_opt(23, 59, 59, 999_999)?.and_utc();
    Some((start, end))
}

/// Pure aggregation over shipped line items: distinct order/shipment counts,
/// quantity-weighted selling and cost totals (items without a variant
/// contribute nothing), shipment charges counted once per shipment.
pub fn fold_stats(
    rows: &[ShippedItemRow],
    window: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> DashboardStats {
    let mut order_ids = HashSet::new();
    let mut shipment_ids = HashSet::new();
    let mut total_products: i64 = 0;
    let mut total_selling_price = Decimal::ZERO;
    let mut total_cost_price = Decimal::ZERO;
    let mut total_shipment_charges = Decimal::ZERO;

    for row in rows {
        order_ids.insert(row.order_id);
        total_products += row.quantity as i64;

        let quantity = Decimal::from(row.quantity);
        if let (Some(price), Some(cost)) = (row.product_price, row.product_cost) {
            total_selling_price += quantity * price;
            total_cost_price += quantity * cost;
        }

        if shipment_ids.insert(row.shipment_id) {
            total_shipment_charges += row.shipment_charge;
        }
    }

    let gross_profit = total_selling_price - total_cost_price;
    let net_profit = gross_profit - total_shipment_charges;

    DashboardStats {
        total_orders: order_ids.len() as i64,
        total_shipments: shipment_ids.len() as i64,
        total_products,
        total_selling_price,
        total_cost_price,
        gross_profit,
        total_shipment_charges,
        net_profit,
        date_range: DateRange {
            start: window.map(|(s, _)| s),
            end: window.map(|(_, e)| e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(
        order: Uuid,
        shipment: Uuid,
        quantity: i32,
        price: Option<Decimal>,
        cost: Option<Decimal>,
        charge: Decimal,
    ) -> ShippedItemRow {
        ShippedItemRow {
            order_id: order,
            shipment_id: shipment,
            quantity,
            product_price: price,
            product_cost: cost,
            shipment_charge: charge,
        }
    }

    #[test]
    fn two_item_example_from_the_dashboard() {
        let order = Uuid::new_v4();
        let shipment = Uuid::new_v4();
        let rows = vec![
            row(order, shipment, 3, Some(dec!(10)), Some(dec!(6)), dec!(4)),
            row(order, shipment, 1, Some(dec!(20)), Some(dec!(15)), dec!(4)),
        ];
        let stats = fold_stats(&rows, None);

        assert_eq!(stats.total_orders, 1);
        assert_eq!(stats.total_shipments, 1);
        assert_eq!(stats.total_products, 4);
        assert_eq!(stats.total_selling_price, dec!(50));
        assert_eq!(stats.total_cost_price, dec!(33));
        assert_eq!(stats.gross_profit, dec!(17));
        // Two items share the shipment; its charge counts once.
        assert_eq!(stats.total_shipment_charges, dec!(4));
        assert_eq!(stats.net_profit, dec!(13));
    }

    #[test]
    fn item_without_variant_is_excluded_from_totals() {
        let order = Uuid::new_v4();
        let shipment = Uuid::new_v4();
        let rows = vec![
            row(order, shipment, 2, Some(dec!(10)), Some(dec!(5)), dec!(1)),
            row(order, shipment, 7, None, None, dec!(1)),
        ];
        let stats = fold_stats(&rows, None);

        assert_eq!(stats.total_selling_price, dec!(20));
        assert_eq!(stats.total_cost_price, dec!(10));
        // Quantity still counts even when the variant is missing.
        assert_eq!(stats.total_products, 9);
    }

    #[test]
    fn distinct_counts_across_orders_and_shipments() {
        let (o1, o2) = (Uuid::new_v4(), Uuid::new_v4());
        let (s1, s2) = (Uuid::new_v4(), Uuid::new_v4());
        let rows = vec![
            row(o1, s1, 1, Some(dec!(5)), Some(dec!(2)), dec!(3)),
            row(o1, s2, 1, Some(dec!(5)), Some(dec!(2)), dec!(7)),
            row(o2, s2, 1, Some(dec!(5)), Some(dec!(2)), dec!(7)),
        ];
        let stats = fold_stats(&rows, None);

        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.total_shipments, 2);
        assert_eq!(stats.total_shipment_charges, dec!(10));
    }

    #[test]
    fn window_bounds_are_inclusive_day_edges() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let (lo, hi) = parse_window(Some(start), Some(end)).unwrap();
        assert_eq!(lo.to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert!(hi > lo);
        assert_eq!(hi.date_naive(), end);
    }

    #[test]
    fn window_requires_both_dates() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(parse_window(Some(date), None).is_none());
        assert!(parse_window(None, Some(date)).is_none());
    }
}
