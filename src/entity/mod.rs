pub mod customers;
pub mod order_items;
pub mod orders;
pub mod product_images;
pub mod product_variants;
pub mod products;
pub mod shipments;
pub mod shopify_products;
pub mod users;

pub use customers::Entity as Customers;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use product_images::Entity as ProductImages;
pub use product_variants::Entity as ProductVariants;
pub use products::Entity as Products;
pub use shipments::Entity as Shipments;
pub use shopify_products::Entity as ShopifyProducts;
pub use users::Entity as Users;
