use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::orders::{
        CreateOrderRequest, OrderDetail, OrderItemDetail, OrderItemInput, OrderList,
        UpdateOrderRequest,
    },
    entity::{
        customers::{ActiveModel as CustomerActive, Column as CustomerCol, Entity as Customers},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        product_variants::{Column as VariantCol, Entity as ProductVariants},
        products::{Column as ProdCol, Entity as Products},
        shipments::{Column as ShipmentCol, Entity as Shipments},
        order_items,
        products,
    },
    error::{AppError, AppResult, validation_map},
    models::OrderStatus,
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, per_page, offset) = query.pagination().normalize();

    let mut condition = Condition::all().add(OrderCol::DeletedAt.is_null());
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    // Brand filters on any line item's product, case-sensitive substring.
    if let Some(brand) = query.brand.as_ref().filter(|b| !b.is_empty()) {
        let matching: Vec<Uuid> = OrderItems::find()
            .join(JoinType::InnerJoin, order_items::Relation::Products.def())
            .filter(products::Column::Brand.like(format!("%{brand}%")))
            .select_only()
            .column(OrderItemCol::OrderId)
            .distinct()
            .into_tuple()
            .all(&state.orm)
            .await?;
        condition = condition.add(OrderCol::Id.is_in(matching));
    }

    let finder = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let orders = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let details = load_order_details(&state.orm, orders).await?;
    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: details },
        Some(meta),
    ))
}

pub async fn get_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<OrderDetail>> {
    let order = find_live_order(&state.orm, id).await?;
    let detail = load_order_details(&state.orm, vec![order])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Order", detail, Some(Meta::empty())))
}

pub async fn create_order(
    state: &AppState,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderDetail>> {
    let mut errors = match payload.validate() {
        Ok(()) => BTreeMap::new(),
        Err(e) => validation_map(&e),
    };
    if payload.total_price < Decimal::ZERO {
        errors.insert(
            "total_price".into(),
            "The total_price must not be negative.".into(),
        );
    }

    let txn = state.orm.begin().await?;

    check_item_references(&txn, &payload.items, &mut errors).await?;
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    // Find-or-create the customer by email; an existing customer's details
    // are left untouched.
    let customer = Customers::find()
        .filter(
            Condition::all()
                .add(CustomerCol::Email.eq(payload.customer_email.clone()))
                .add(CustomerCol::DeletedAt.is_null()),
        )
        .one(&txn)
        .await?;
    let customer = match customer {
        Some(c) => c,
        None => {
            CustomerActive {
                id: Set(Uuid::new_v4()),
                name: Set(payload.customer_name),
                address: Set(payload.customer_address),
                city: Set(payload.customer_city),
                phone_number: Set(payload.customer_phone_number),
                email: Set(payload.customer_email),
                payment_method: Set(payload.customer_payment_method),
                created_at: NotSet,
                updated_at: NotSet,
                deleted_at: Set(None),
            }
            .insert(&txn)
            .await?
        }
    };

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer.id),
        delivery_time: Set(payload.delivery_time.map(Into::into)),
        total_price: Set(payload.total_price),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    }
    .insert(&txn)
    .await?;

    insert_items(&txn, order.id, &payload.items).await?;
    txn.commit().await?;

    let detail = load_order_details(&state.orm, vec![order])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Order created successfully",
        detail,
        Some(Meta::empty()),
    ))
}

pub async fn update_order(
    state: &AppState,
    id: Uuid,
    payload: UpdateOrderRequest,
) -> AppResult<ApiResponse<OrderDetail>> {
    let mut errors = match payload.validate() {
        Ok(()) => BTreeMap::new(),
        Err(e) => validation_map(&e),
    };
    if payload.total_price < Decimal::ZERO {
        errors.insert(
            "total_price".into(),
            "The total_price must not be negative.".into(),
        );
    }

    let txn = state.orm.begin().await?;
    let order = find_live_order(&txn, id).await?;

    check_item_references(&txn, &payload.items, &mut errors).await?;
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let customer = Customers::find_by_id(order.customer_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let mut customer_active: CustomerActive = customer.into();
    customer_active.name = Set(payload.customer_name);
    customer_active.address = Set(payload.customer_address);
    customer_active.city = Set(payload.customer_city);
    customer_active.phone_number = Set(payload.customer_phone_number);
    customer_active.email = Set(payload.customer_email);
    customer_active.payment_method = Set(payload.customer_payment_method);
    customer_active.updated_at = Set(Utc::now().into());
    customer_active.update(&txn).await?;

    // Full replacement of the line item set.
    OrderItems::delete_many()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .exec(&txn)
        .await?;
    insert_items(&txn, order.id, &payload.items).await?;

    let mut order_active: OrderActive = order.into();
    order_active.delivery_time = Set(payload.delivery_time.map(Into::into));
    order_active.total_price = Set(payload.total_price);
    if let Some(status) = payload.status {
        order_active.status = Set(status.as_str().to_string());
    }
    order_active.updated_at = Set(Utc::now().into());
    let order = order_active.update(&txn).await?;

    txn.commit().await?;

    let detail = load_order_details(&state.orm, vec![order])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Order and related data updated",
        detail,
        Some(Meta::empty()),
    ))
}

/// Cascading delete. Shipments referenced by the order's items are
/// soft-deleted; the customer is only removed when `purge_customer` is set,
/// since a customer can own other orders.
pub async fn delete_order(
    state: &AppState,
    id: Uuid,
    purge_customer: bool,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    let order = find_live_order(&txn, id).await?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&txn)
        .await?;
    let shipment_ids: HashSet<Uuid> = items.iter().filter_map(|i| i.shipment_id).collect();

    let now = Utc::now();
    if !shipment_ids.is_empty() {
        Shipments::update_many()
            .col_expr(ShipmentCol::DeletedAt, Expr::value(Some(now)))
            .filter(ShipmentCol::Id.is_in(shipment_ids.iter().copied().collect::<Vec<_>>()))
            .filter(ShipmentCol::DeletedAt.is_null())
            .exec(&txn)
            .await?;
    }

    OrderItems::delete_many()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .exec(&txn)
        .await?;

    if purge_customer {
        CustomerActive {
            id: Set(order.customer_id),
            deleted_at: Set(Some(now.into())),
            ..Default::default()
        }
        .update(&txn)
        .await?;
    }

    let mut order_active: OrderActive = order.into();
    order_active.deleted_at = Set(Some(now.into()));
    order_active.update(&txn).await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Order and related data deleted successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn find_live_order<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<OrderModel> {
    Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::Id.eq(id))
                .add(OrderCol::DeletedAt.is_null()),
        )
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

/// Verify every referenced product (and optional variant) exists and pushes a
/// violation per offending line into `errors`, so the caller reports all of
/// them in one 422.
async fn check_item_references<C: ConnectionTrait>(
    conn: &C,
    items: &[OrderItemInput],
    errors: &mut BTreeMap<String, String>,
) -> AppResult<()> {
    let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    let live_products: HashSet<Uuid> = Products::find()
        .filter(
            Condition::all()
                .add(ProdCol::Id.is_in(product_ids))
                .add(ProdCol::DeletedAt.is_null()),
        )
        .all(conn)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();

    let variant_ids: Vec<Uuid> = items.iter().filter_map(|i| i.variant_id).collect();
    let variants: HashMap<Uuid, Uuid> = ProductVariants::find()
        .filter(VariantCol::Id.is_in(variant_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|v| (v.id, v.product_id))
        .collect();

    for (index, item) in items.iter().enumerate() {
        if !live_products.contains(&item.product_id) {
            errors.insert(
                format!("items.{index}.product_id"),
                format!("Product {} does not exist.", item.product_id),
            );
        }
        if let Some(variant_id) = item.variant_id {
            match variants.get(&variant_id) {
                Some(product_id) if *product_id == item.product_id => {}
                Some(_) => {
                    errors.insert(
                        format!("items.{index}.variant_id"),
                        format!(
                            "Variant {variant_id} does not belong to product {}.",
                            item.product_id
                        ),
                    );
                }
                None => {
                    errors.insert(
                        format!("items.{index}.variant_id"),
                        format!("Variant {variant_id} does not exist."),
                    );
                }
            }
        }
    }

    Ok(())
}

async fn insert_items<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    items: &[OrderItemInput],
) -> AppResult<()> {
    for item in items {
        OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_id: Set(item.product_id),
            variant_id: Set(item.variant_id),
            shipment_id: Set(None),
            quantity: Set(item.quantity),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

/// Resolve customers, line items (with product, variant and shipment) for a
/// page of orders in a fixed number of queries.
pub async fn load_order_details<C: ConnectionTrait>(
    conn: &C,
    orders: Vec<OrderModel>,
) -> AppResult<Vec<OrderDetail>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let customer_ids: Vec<Uuid> = orders.iter().map(|o| o.customer_id).collect();

    let customers: HashMap<Uuid, _> = Customers::find()
        .filter(CustomerCol::Id.is_in(customer_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .all(conn)
        .await?;

    let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    let variant_ids: Vec<Uuid> = items.iter().filter_map(|i| i.variant_id).collect();
    let shipment_ids: Vec<Uuid> = items.iter().filter_map(|i| i.shipment_id).collect();

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
    let shipment_map: HashMap<Uuid, _> = Shipments::find()
        .filter(ShipmentCol::Id.is_in(shipment_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let mut items_by_order: HashMap<Uuid, Vec<OrderItemDetail>> = HashMap::new();
    for item in items {
        let Some(product) = product_map.get(&item.product_id) else {
            continue;
        };
        let detail = OrderItemDetail {
            product: product.clone().into(),
            variant: item
                .variant_id
                .and_then(|id| variant_map.get(&id))
                .map(|v| v.clone().into()),
            shipment: item
                .shipment_id
                .and_then(|id| shipment_map.get(&id))
                .map(|s| s.clone().into()),
            item: item.into(),
        };
        items_by_order
            .entry(detail.item.order_id)
            .or_default()
            .push(detail);
    }

    let mut details = Vec::with_capacity(orders.len());
    for order in orders {
        let customer = customers
            .get(&order.customer_id)
            .cloned()
            .ok_or(AppError::NotFound)?;
        let items = items_by_order.remove(&order.id).unwrap_or_default();
        let shipment = items.iter().find_map(|i| i.shipment.clone());
        details.push(OrderDetail {
            order: order.into(),
            customer: customer.into(),
            items,
            shipment,
        });
    }
    Ok(details)
}
