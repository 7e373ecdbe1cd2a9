use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::shopify::ShopifyProductList,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::Pagination,
    services::shopify_sync,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_mirror))
}

#[utoipa::path(
    get,
    path = "/api/shopify-products",
    params(
        ("limit" = Option<i64>, Query, description = "Page size, default 10"),
        ("page" = Option<i64>, Query, description = "Page number"),
    ),
    responses((status = 200, description = "Mirrored Shopify catalog page", body = ApiResponse<ShopifyProductList>)),
    security(("bearer_auth" = [])),
    tag = "Shopify"
)]
pub async fn list_mirror(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ShopifyProductList>>> {
    let resp = shopify_sync::list_mirror(&state, pagination).await?;
    Ok(Json(resp))
}
