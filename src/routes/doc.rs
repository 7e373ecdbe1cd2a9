use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        order_items::{UnassignedOrderItem, UnassignedOrderItemList},
        orders::{CreateOrderRequest, OrderDetail, OrderItemDetail, OrderList, UpdateOrderRequest},
        products::{CreateProductRequest, ProductDetail, ProductList, UpdateProductRequest},
        reports::{DashboardStats, DateRange},
        shipments::{ShipmentDetail, ShipmentItemDetail, ShipmentList, ShipmentPayload, ShipmentWithOrders},
        shopify::ShopifyProductList,
    },
    models::{
        Customer, Order, OrderItem, Product, ProductImage, ProductVariant, Shipment,
        ShopifyProduct, User,
    },
    response::{ApiResponse, Meta},
    routes::{
        auth, dashboard, health, order_items, orders, params, products, shipments,
        shopify_products,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::logout,
        auth::user,
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::update_order,
        orders::delete_order,
        shipments::list_shipments,
        shipments::create_shipment,
        shipments::get_shipment,
        shipments::update_shipment,
        shipments::delete_shipment,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        order_items::list_unassigned,
        shopify_products::list_mirror,
        dashboard::stats
    ),
    components(
        schemas(
            User,
            Customer,
            Product,
            ProductVariant,
            ProductImage,
            Order,
            OrderItem,
            Shipment,
            ShopifyProduct,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateOrderRequest,
            UpdateOrderRequest,
            OrderDetail,
            OrderItemDetail,
            OrderList,
            ShipmentPayload,
            ShipmentDetail,
            ShipmentItemDetail,
            ShipmentList,
            ShipmentWithOrders,
            CreateProductRequest,
            UpdateProductRequest,
            ProductDetail,
            ProductList,
            UnassignedOrderItem,
            UnassignedOrderItemList,
            ShopifyProductList,
            DashboardStats,
            DateRange,
            health::HealthData,
            params::Pagination,
            params::OrderListQuery,
            params::ProductQuery,
            params::OrderItemQuery,
            params::DashboardQuery,
            Meta,
            ApiResponse<OrderDetail>,
            ApiResponse<OrderList>,
            ApiResponse<ShipmentWithOrders>,
            ApiResponse<ShipmentList>,
            ApiResponse<ProductDetail>,
            ApiResponse<ProductList>,
            ApiResponse<ShopifyProductList>,
            ApiResponse<DashboardStats>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Shipments", description = "Shipment endpoints"),
        (name = "Products", description = "Product endpoints"),
        (name = "Order Items", description = "Line item endpoints"),
        (name = "Shopify", description = "Shopify catalog mirror"),
        (name = "Dashboard", description = "Profit and volume reporting"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
