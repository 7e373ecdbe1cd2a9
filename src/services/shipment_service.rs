use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::shipments::{
        ShipmentDetail, ShipmentItemDetail, ShipmentList, ShipmentPayload, ShipmentWithOrders,
    },
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{Column as OrderCol, Entity as Orders},
        product_variants::{Column as VariantCol, Entity as ProductVariants},
        products::{Column as ProdCol, Entity as Products},
        shipments::{
            ActiveModel as ShipmentActive, Column as ShipmentCol, Entity as Shipments,
            Model as ShipmentModel,
        },
    },
    error::{AppError, AppResult, validation_map},
    models::OrderStatus,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn create_shipment(
    state: &AppState,
    payload: ShipmentPayload,
) -> AppResult<ApiResponse<ShipmentWithOrders>> {
    let mut errors = match payload.validate() {
        Ok(()) => BTreeMap::new(),
        Err(e) => validation_map(&e),
    };

    let txn = state.orm.begin().await?;

    check_item_ids(&txn, &payload.order_item_ids, &mut errors).await?;
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let shipment = ShipmentActive {
        id: Set(Uuid::new_v4()),
        brand: Set(payload.brand),
        quantity: Set(payload.quantity),
        description: Set(payload.description),
        arriving_at: Set(payload.arriving_at.into()),
        price: Set(payload.price),
        total_price_variant: Set(payload.total_price_variant),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    }
    .insert(&txn)
    .await?;

    let order_ids = attach_items(&txn, shipment.id, &payload.order_item_ids).await?;
    set_order_status(&txn, &order_ids, OrderStatus::InProgress).await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Shipment created successfully",
        ShipmentWithOrders {
            shipment: shipment.into(),
            order_ids,
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_shipment(
    state: &AppState,
    id: Uuid,
    payload: ShipmentPayload,
) -> AppResult<ApiResponse<ShipmentWithOrders>> {
    let mut errors = match payload.validate() {
        Ok(()) => BTreeMap::new(),
        Err(e) => validation_map(&e),
    };

    let txn = state.orm.begin().await?;
    let shipment = find_live_shipment(&txn, id).await?;

    check_item_ids(&txn, &payload.order_item_ids, &mut errors).await?;
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let mut active: ShipmentActive = shipment.into();
    active.brand = Set(payload.brand);
    active.quantity = Set(payload.quantity);
    active.description = Set(payload.description);
    active.arriving_at = Set(payload.arriving_at.into());
    active.price = Set(payload.price);
    active.total_price_variant = Set(payload.total_price_variant);
    active.updated_at = Set(Utc::now().into());
    let shipment = active.update(&txn).await?;

    // Remember which orders were attached before the reassignment so the
    // ones left with nothing shipped can be reverted.
    let previous_order_ids = order_ids_of_shipment(&txn, shipment.id).await?;

    detach_items(&txn, shipment.id).await?;
    let order_ids = attach_items(&txn, shipment.id, &payload.order_item_ids).await?;
    set_order_status(&txn, &order_ids, OrderStatus::InProgress).await?;

    // Orders dropped by this update go back to Pending unless some other
    // shipment still covers one of their items.
    let current: HashSet<Uuid> = order_ids.iter().copied().collect();
    let orphaned: Vec<Uuid> = {
        let candidates: Vec<Uuid> = previous_order_ids
            .into_iter()
            .filter(|id| !current.contains(id))
            .collect();
        if candidates.is_empty() {
            Vec::new()
        } else {
            let still_shipped: HashSet<Uuid> = OrderItems::find()
                .filter(OrderItemCol::OrderId.is_in(candidates.clone()))
                .filter(OrderItemCol::ShipmentId.is_not_null())
                .select_only()
                .column(OrderItemCol::OrderId)
                .distinct()
                .into_tuple()
                .all(&txn)
                .await?
                .into_iter()
                .collect();
            candidates
                .into_iter()
                .filter(|id| !still_shipped.contains(id))
                .collect()
        }
    };
    set_order_status(&txn, &orphaned, OrderStatus::Pending).await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Shipment updated successfully",
        ShipmentWithOrders {
            shipment: shipment.into(),
            order_ids,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_shipment(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ShipmentDetail>> {
    let shipment = find_live_shipment(&state.orm, id).await?;
    let detail = load_shipment_details(&state.orm, vec![shipment])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Shipment", detail, Some(Meta::empty())))
}

pub async fn list_shipments(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<ShipmentList>> {
    let (page, per_page, offset) = pagination.normalize();

    let finder = Shipments::find()
        .filter(ShipmentCol::DeletedAt.is_null())
        .order_by_desc(ShipmentCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let shipments = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let details = load_shipment_details(&state.orm, shipments).await?;
    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success(
        "Shipments",
        ShipmentList { items: details },
        Some(meta),
    ))
}

/// Deleting a shipment reverts every affected order to Pending, whether or
/// not that order still has items in other shipments.
pub async fn delete_shipment(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<ShipmentWithOrders>> {
    let txn = state.orm.begin().await?;
    let shipment = find_live_shipment(&txn, id).await?;

    // Collect affected orders before detaching, otherwise there is nothing
    // left to revert.
    let order_ids = order_ids_of_shipment(&txn, shipment.id).await?;

    detach_items(&txn, shipment.id).await?;
    set_order_status(&txn, &order_ids, OrderStatus::Pending).await?;

    let mut active: ShipmentActive = shipment.clone().into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.update(&txn).await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Shipment deleted and related orders reverted to Pending",
        ShipmentWithOrders {
            shipment: shipment.into(),
            order_ids,
        },
        Some(Meta::empty()),
    ))
}

async fn find_live_shipment<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<ShipmentModel> {
    Shipments::find()
        .filter(
            Condition::all()
                .add(ShipmentCol::Id.eq(id))
                .add(ShipmentCol::DeletedAt.is_null()),
        )
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

async fn check_item_ids<C: ConnectionTrait>(
    conn: &C,
    ids: &[Uuid],
    errors: &mut BTreeMap<String, String>,
) -> AppResult<()> {
    let found: HashSet<Uuid> = OrderItems::find()
        .filter(OrderItemCol::Id.is_in(ids.to_vec()))
        .all(conn)
        .await?
        .into_iter()
        .map(|i| i.id)
        .collect();
    for (index, id) in ids.iter().enumerate() {
        if !found.contains(id) {
            errors.insert(
                format!("order_item_ids.{index}"),
                format!("Order item {id} does not exist."),
            );
        }
    }
    Ok(())
}

/// Assign the items and return the distinct set of orders they belong to.
async fn attach_items<C: ConnectionTrait>(
    conn: &C,
    shipment_id: Uuid,
    item_ids: &[Uuid],
) -> AppResult<Vec<Uuid>> {
    OrderItems::update_many()
        .col_expr(OrderItemCol::ShipmentId, Expr::value(Some(shipment_id)))
        .filter(OrderItemCol::Id.is_in(item_ids.to_vec()))
        .exec(conn)
        .await?;

    let order_ids: Vec<Uuid> = OrderItems::find()
        .filter(OrderItemCol::Id.is_in(item_ids.to_vec()))
        .select_only()
        .column(OrderItemCol::OrderId)
        .distinct()
        .into_tuple()
        .all(conn)
        .await?;
    Ok(order_ids)
}

async fn detach_items<C: ConnectionTrait>(conn: &C, shipment_id: Uuid) -> AppResult<()> {
    OrderItems::update_many()
        .col_expr(OrderItemCol::ShipmentId, Expr::value(None::<Uuid>))
        .filter(OrderItemCol::ShipmentId.eq(shipment_id))
        .exec(conn)
        .await?;
    Ok(())
}

async fn order_ids_of_shipment<C: ConnectionTrait>(
    conn: &C,
    shipment_id: Uuid,
) -> AppResult<Vec<Uuid>> {
    let ids: Vec<Uuid> = OrderItems::find()
        .filter(OrderItemCol::ShipmentId.eq(shipment_id))
        .select_only()
        .column(OrderItemCol::OrderId)
        .distinct()
        .into_tuple()
        .all(conn)
        .await?;
    Ok(ids)
}

async fn set_order_status<C: ConnectionTrait>(
    conn: &C,
    order_ids: &[Uuid],
    status: OrderStatus,
) -> AppResult<()> {
    if order_ids.is_empty() {
        return Ok(());
    }
    Orders::update_many()
        .col_expr(OrderCol::Status, Expr::value(status.as_str()))
        .col_expr(OrderCol::UpdatedAt, Expr::value(Utc::now()))
        .filter(OrderCol::Id.is_in(order_ids.to_vec()))
        .filter(OrderCol::DeletedAt.is_null())
        .exec(conn)
        .await?;
    Ok(())
}

/// Resolve each shipment's items with their order, product and variant.
async fn load_shipment_details<C: ConnectionTrait>(
    conn: &C,
    shipments: Vec<ShipmentModel>,
) -> AppResult<Vec<ShipmentDetail>> {
    if shipments.is_empty() {
        return Ok(Vec::new());
    }

    let shipment_ids: Vec<Uuid> = shipments.iter().map(|s| s.id).collect();
    let items = OrderItems::find()
        .filter(OrderItemCol::ShipmentId.is_in(shipment_ids))
        .all(conn)
        .await?;

    let order_ids: Vec<Uuid> = items.iter().map(|i| i.order_id).collect();
    let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    let variant_ids: Vec<Uuid> = items.iter().filter_map(|i| i.variant_id).collect();

    let order_map: HashMap<Uuid, _> = Orders::find()
        .filter(OrderCol::Id.is_in(order_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|o| (o.id, o))
        .collect();
    let product_map: HashMap<Uuid, _> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();
    let variant_map: HashMap<Uuid, _> = ProductVariants::find()
        .filter(VariantCol::Id.is_in(variant_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|v| (v.id, v))
        .collect();

    let mut items_by_shipment: HashMap<Uuid, Vec<ShipmentItemDetail>> = HashMap::new();
    for item in items {
        let Some(shipment_id) = item.shipment_id else {
            continue;
        };
        let detail = ShipmentItemDetail {
            order: order_map.get(&item.order_id).map(|o| o.clone().into()),
            product: product_map.get(&item.product_id).map(|p| p.clone().into()),
            variant: item
                .variant_id
                .and_then(|id| variant_map.get(&id))
                .map(|v| v.clone().into()),
            item: item.into(),
        };
        items_by_shipment.entry(shipment_id).or_default().push(detail);
    }

    Ok(shipments
        .into_iter()
        .map(|shipment| {
            let items = items_by_shipment.remove(&shipment.id).unwrap_or_default();
            ShipmentDetail {
                shipment: shipment.into(),
                items,
            }
        })
        .collect())
}
