use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::reports::DashboardStats,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::DashboardQuery,
    services::report_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(stats))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    params(
        ("start_date" = Option<String>, Query, description = "Window start, YYYY-MM-DD; ignored unless end_date is also set"),
        ("end_date" = Option<String>, Query, description = "Window end, YYYY-MM-DD; ignored unless start_date is also set"),
    ),
    responses(
        (status = 200, description = "Profit and volume figures over shipped items", body = ApiResponse<DashboardStats>)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn stats(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let resp = report_service::dashboard_stats(&state, query).await?;
    Ok(Json(resp))
}
