use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, Condition, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait,
};
use uuid::Uuid;

use crate::{
    dto::order_items::{UnassignedOrderItem, UnassignedOrderItemList},
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        order_items,
        products::{Column as ProdCol, Entity as Products},
        products,
    },
    error::AppResult,
    response::{ApiResponse, Meta},
    routes::params::OrderItemQuery,
    state::AppState,
};

/// Line items not yet assigned to any shipment, optionally narrowed to an
/// exact product brand.
pub async fn list_unassigned(
    state: &AppState,
    query: OrderItemQuery,
) -> AppResult<ApiResponse<UnassignedOrderItemList>> {
    let (page, per_page, offset) = query.pagination().normalize();

    let mut condition = Condition::all().add(OrderItemCol::ShipmentId.is_null());
    if let Some(brand) = query.brand.as_ref().filter(|b| !b.is_empty()) {
        condition = condition.add(products::Column::Brand.eq(brand.clone()));
    }

    let finder = OrderItems::find()
        .join(JoinType::InnerJoin, order_items::Relation::Products.def())
        .filter(condition)
        .order_by_desc(OrderItemCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    let product_map: HashMap<Uuid, _> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let rows = items
        .into_iter()
        .filter_map(|item| {
            product_map.get(&item.product_id).map(|product| UnassignedOrderItem {
                id: item.id,
                order_id: item.order_id,
                quantity: item.quantity,
                product: product.clone().into(),
            })
        })
        .collect();

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success(
        "Order items",
        UnassignedOrderItemList { items: rows },
        Some(meta),
    ))
}
