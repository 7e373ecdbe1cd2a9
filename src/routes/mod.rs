use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod dashboard;
pub mod doc;
pub mod health;
pub mod order_items;
pub mod orders;
pub mod params;
pub mod products;
pub mod shipments;
pub mod shopify_products;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .nest("/orders", orders::router())
        .nest("/shipments", shipments::router())
        .nest("/products", products::router())
        .nest("/order-item", order_items::router())
        .nest("/shopify-products", shopify_products::router())
        .nest("/dashboard", dashboard::router())
}
