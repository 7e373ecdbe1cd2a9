use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::shipments::{ShipmentDetail, ShipmentList, ShipmentPayload, ShipmentWithOrders},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::Pagination,
    services::shipment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_shipments).post(create_shipment))
        .route(
            "/{id}",
            get(get_shipment).put(update_shipment).delete(delete_shipment),
        )
}

#[utoipa::path(
    get,
    path = "/api/shipments",
    params(
        ("limit" = Option<i64>, Query, description = "Page size, default 10"),
        ("page" = Option<i64>, Query, description = "Page number"),
    ),
    responses((status = 200, description = "Shipment page", body = ApiResponse<ShipmentList>)),
    security(("bearer_auth" = [])),
    tag = "Shipments"
)]
pub async fn list_shipments(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ShipmentList>>> {
    let resp = shipment_service::list_shipments(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/shipments",
    request_body = ShipmentPayload,
    responses(
        (status = 201, description = "Shipment created", body = ApiResponse<ShipmentWithOrders>),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Shipments"
)]
pub async fn create_shipment(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<ShipmentPayload>,
) -> AppResult<(StatusCode, Json<ApiResponse<ShipmentWithOrders>>)> {
    let resp = shipment_service::create_shipment(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/shipments/{id}",
    responses(
        (status = 200, description = "Shipment detail", body = ApiResponse<ShipmentDetail>),
        (status = 404, description = "Shipment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shipments"
)]
pub async fn get_shipment(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ShipmentDetail>>> {
    let resp = shipment_service::get_shipment(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/shipments/{id}",
    request_body = ShipmentPayload,
    responses(
        (status = 200, description = "Shipment updated", body = ApiResponse<ShipmentWithOrders>),
        (status = 404, description = "Shipment not found"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Shipments"
)]
pub async fn update_shipment(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ShipmentPayload>,
) -> AppResult<Json<ApiResponse<ShipmentWithOrders>>> {
    let resp = shipment_service::update_shipment(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/shipments/{id}",
    responses(
        (status = 200, description = "Shipment deleted, orders reverted", body = ApiResponse<ShipmentWithOrders>),
        (status = 404, description = "Shipment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shipments"
)]
pub async fn delete_shipment(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ShipmentWithOrders>>> {
    let resp = shipment_service::delete_shipment(&state, id).await?;
    Ok(Json(resp))
}
