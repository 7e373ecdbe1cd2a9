pub mod auth_service;
pub mod order_item_service;
pub mod order_service;
pub mod product_service;
pub mod report_service;
pub mod shipment_service;
pub mod shopify_sync;
