use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::order_items::UnassignedOrderItemList,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::OrderItemQuery,
    services::order_item_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_unassigned))
}

#[utoipa::path(
    get,
    path = "/api/order-item",
    params(
        ("brand" = Option<String>, Query, description = "Exact brand match on the item's product"),
        ("limit" = Option<i64>, Query, description = "Page size, default 10"),
        ("page" = Option<i64>, Query, description = "Page number"),
    ),
    responses((status = 200, description = "Line items with no shipment", body = ApiResponse<UnassignedOrderItemList>)),
    security(("bearer_auth" = [])),
    tag = "Order Items"
)]
pub async fn list_unassigned(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<OrderItemQuery>,
) -> AppResult<Json<ApiResponse<UnassignedOrderItemList>>> {
    let resp = order_item_service::list_unassigned(&state, query).await?;
    Ok(Json(resp))
}
