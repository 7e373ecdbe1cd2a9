pub mod auth;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod reports;
pub mod shipments;
pub mod shopify;
