use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::ShopifyConfig,
    entity::{
        product_images::{ActiveModel as ImageActive, Column as ImageCol, Entity as ProductImages},
        product_variants::{
            ActiveModel as VariantActive, Column as VariantCol, Entity as ProductVariants,
            Model as VariantModel,
        },
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
        shopify_products::{
            ActiveModel as MirrorActive, Column as MirrorCol, Entity as ShopifyProducts,
        },
    },
    error::AppResult,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteImage {
    pub id: i64,
    pub src: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteVariant {
    pub id: i64,
    pub title: Option<String>,
    pub sku: Option<String>,
    pub price: Option<String>,
    pub inventory_quantity: Option<i64>,
    pub image_id: Option<i64>,
    pub option1: Option<String>,
    pub option2: Option<String>,
    pub option3: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteProduct {
    pub id: i64,
    pub title: String,
    pub body_html: Option<String>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub handle: Option<String>,
    #[serde(default)]
    pub images: Vec<RemoteImage>,
    #[serde(default)]
    pub variants: Vec<RemoteVariant>,
}

#[derive(Debug, Deserialize)]
struct ProductsPage {
    #[serde(default)]
    products: Vec<RemoteProduct>,
}

#[derive(Debug, Default)]
pub struct SyncStats {
    pub pages: u32,
    pub products: u64,
    pub variants: u64,
    pub images: u64,
}

/// Pull the full remote catalog and upsert it. A failed page fetch is logged
/// and stops the loop; pages already applied stay committed. The loop is
/// bounded by `max_pages` and paced by `page_delay_ms`.
pub async fn run_sync<C: ConnectionTrait>(
    conn: &C,
    config: &ShopifyConfig,
) -> AppResult<SyncStats> {
    let client = reqwest::Client::new();
    let mut stats = SyncStats::default();
    let mut url = config.first_page_url();

    for _ in 0..config.max_pages {
        let response = match client
            .get(&url)
            .header("X-Shopify-Access-Token", &config.access_token)
            .send()
            .await
        {
            Ok(r) => r,
            Err(err) => {
                tracing::error!(url = %url, error = %err, "catalog fetch failed");
                break;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(url = %url, %status, body = %body, "catalog fetch returned error");
            break;
        }

        let next = response
            .headers()
            .get("link")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_next_link);

        let page: ProductsPage = match response.json().await {
            Ok(p) => p,
            Err(err) => {
                tracing::error!(url = %url, error = %err, "catalog page decode failed");
                break;
            }
        };

        let page_stats = apply_products(conn, &page.products).await?;
        stats.pages += 1;
        stats.products += page_stats.products;
        stats.variants += page_stats.variants;
        stats.images += page_stats.images;

        match next {
            Some(next_url) => url = next_url,
            None => break,
        }
        tokio::time::sleep(Duration::from_millis(config.page_delay_ms)).await;
    }

    Ok(stats)
}

/// Extract the `rel="next"` URL from a Shopify `Link` response header.
pub fn parse_next_link(header: &str) -> Option<String> {
    for part in header.split(',') {
        let part = part.trim();
        if !part.contains("rel=\"next\"") {
            continue;
        }
        let start = part.find('<')?;
        let end = part.find('>')?;
        if start < end {
            return Some(part[start + 1..end].to_string());
        }
    }
    None
}

/// Upsert one page of remote products. Running this repeatedly over the same
/// payload changes nothing: products key on the external id, variants on
/// (sku, product), images on (product, path, variant association).
pub async fn apply_products<C: ConnectionTrait>(
    conn: &C,
    products: &[RemoteProduct],
) -> AppResult<SyncStats> {
    let mut stats = SyncStats::default();

    for remote in products {
        let product_id = upsert_product(conn, remote).await?;
        upsert_mirror(conn, remote).await?;
        stats.products += 1;

        for (index, image) in remote.images.iter().enumerate() {
            if upsert_image(conn, product_id, None, &image.src, index == 0).await? {
                stats.images += 1;
            }
        }

        for remote_variant in &remote.variants {
            let variant = upsert_variant(conn, product_id, remote_variant).await?;
            stats.variants += 1;

            if let Some(image_id) = remote_variant.image_id
                && let Some(image) = remote.images.iter().find(|i| i.id == image_id)
                && upsert_image(conn, product_id, Some(variant.id), &image.src, true).await?
            {
                stats.images += 1;
            }
        }
    }

    Ok(stats)
}

/// Products are keyed by the external id; titles are not guaranteed unique.
async fn upsert_product<C: ConnectionTrait>(conn: &C, remote: &RemoteProduct) -> AppResult<Uuid> {
    let existing = Products::find()
        .filter(ProdCol::ShopifyId.eq(remote.id))
        .one(conn)
        .await?;

    match existing {
        Some(product) => {
            let id = product.id;
            let mut active: ProductActive = product.into();
            active.name = Set(remote.title.clone());
            active.description = Set(remote.body_html.clone());
            active.brand = Set(remote.vendor.clone());
            active.updated_at = Set(Utc::now().into());
            active.update(conn).await?;
            Ok(id)
        }
        None => {
            let product = ProductActive {
                id: Set(Uuid::new_v4()),
                shopify_id: Set(Some(remote.id)),
                name: Set(remote.title.clone()),
                description: Set(remote.body_html.clone()),
                brand: Set(remote.vendor.clone()),
                created_at: NotSet,
                updated_at: NotSet,
                deleted_at: Set(None),
            }
            .insert(conn)
            .await?;
            Ok(product.id)
        }
    }
}

async fn upsert_mirror<C: ConnectionTrait>(conn: &C, remote: &RemoteProduct) -> AppResult<()> {
    let images = serde_json::to_value(&remote.images)
        .map_err(|e| crate::error::AppError::Internal(e.into()))?;
    let variants = serde_json::to_value(&remote.variants)
        .map_err(|e| crate::error::AppError::Internal(e.into()))?;

    let existing = ShopifyProducts::find()
        .filter(MirrorCol::ShopifyId.eq(remote.id))
        .one(conn)
        .await?;

    match existing {
        Some(mirror) => {
            let mut active: MirrorActive = mirror.into();
            active.title = Set(remote.title.clone());
            active.body_html = Set(remote.body_html.clone());
            active.vendor = Set(remote.vendor.clone());
            active.product_type = Set(remote.product_type.clone());
            active.handle = Set(remote.handle.clone());
            active.images = Set(Some(images));
            active.variants = Set(Some(variants));
            active.updated_at = Set(Utc::now().into());
            active.update(conn).await?;
        }
        None => {
            MirrorActive {
                id: Set(Uuid::new_v4()),
                shopify_id: Set(remote.id),
                title: Set(remote.title.clone()),
                body_html: Set(remote.body_html.clone()),
                vendor: Set(remote.vendor.clone()),
                product_type: Set(remote.product_type.clone()),
                handle: Set(remote.handle.clone()),
                images: Set(Some(images)),
                variants: Set(Some(variants)),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(conn)
            .await?;
        }
    }
    Ok(())
}

/// Returns true when a new image row was created.
async fn upsert_image<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    variant_id: Option<Uuid>,
    src: &str,
    is_main: bool,
) -> AppResult<bool> {
    let mut condition = Condition::all()
        .add(ImageCol::ProductId.eq(product_id))
        .add(ImageCol::ImagePath.eq(src));
    condition = match variant_id {
        Some(id) => condition.add(ImageCol::ProductVariantId.eq(id)),
        None => condition.add(ImageCol::ProductVariantId.is_null()),
    };

    let existing = ProductImages::find().filter(condition).one(conn).await?;
    match existing {
        Some(image) => {
            if image.is_main != is_main {
                let mut active: ImageActive = image.into();
                active.is_main = Set(is_main);
                active.updated_at = Set(Utc::now().into());
                active.update(conn).await?;
            }
            Ok(false)
        }
        None => {
            ImageActive {
                id: Set(Uuid::new_v4()),
                product_id: Set(product_id),
                product_variant_id: Set(variant_id),
                image_path: Set(src.to_string()),
                is_main: Set(is_main),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(conn)
            .await?;
            Ok(true)
        }
    }
}

async fn upsert_variant<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    remote: &RemoteVariant,
) -> AppResult<VariantModel> {
    let mut condition = Condition::all().add(VariantCol::ProductId.eq(product_id));
    condition = match remote.sku.as_deref() {
        Some(sku) => condition.add(VariantCol::Sku.eq(sku)),
        None => condition.add(VariantCol::Sku.is_null()),
    };

    let price = parse_price(remote.price.as_deref());
    let stock = remote.inventory_quantity.unwrap_or(0) as i32;
    let attributes = variant_attributes(remote);

    let existing = ProductVariants::find().filter(condition).one(conn).await?;
    let variant = match existing {
        Some(variant) => {
            let mut active: VariantActive = variant.into();
            active.name = Set(remote.title.clone());
            // The remote feed exposes no separate cost, so cost mirrors price.
            active.product_price = Set(Some(price));
            active.product_cost = Set(Some(price));
            active.stock = Set(stock);
            active.attributes = Set(attributes);
            active.updated_at = Set(Utc::now().into());
            active.update(conn).await?
        }
        None => {
            VariantActive {
                id: Set(Uuid::new_v4()),
                product_id: Set(product_id),
                name: Set(remote.title.clone()),
                sku: Set(remote.sku.clone()),
                product_price: Set(Some(price)),
                product_cost: Set(Some(price)),
                stock: Set(stock),
                attributes: Set(attributes),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(conn)
            .await?
        }
    };
    Ok(variant)
}

/// Paginated listing of the denormalized mirror, newest external id first.
pub async fn list_mirror(
    state: &crate::state::AppState,
    pagination: crate::routes::params::Pagination,
) -> AppResult<crate::response::ApiResponse<crate::dto::shopify::ShopifyProductList>> {
    use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect};

    let (page, per_page, offset) = pagination.normalize();

    let finder = ShopifyProducts::find().order_by_desc(MirrorCol::ShopifyId);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let meta = crate::response::Meta::new(page, per_page, total);
    Ok(crate::response::ApiResponse::success(
        "Shopify products",
        crate::dto::shopify::ShopifyProductList { items },
        Some(meta),
    ))
}

fn parse_price(price: Option<&str>) -> Decimal {
    price
        .and_then(|p| Decimal::from_str(p).ok())
        .unwrap_or(Decimal::ZERO)
}

fn variant_attributes(remote: &RemoteVariant) -> serde_json::Value {
    serde_json::json!({
        "option1": remote.option1,
        "option2": remote.option2,
        "option3": remote.option3,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn next_link_is_extracted_from_shopify_header() {
        let header = "<https://shop.example.com/admin/api/2024-01/products.json?page_info=abc&limit=250>; rel=\"previous\", <https://shop.example.com/admin/api/2024-01/products.json?page_info=def&limit=250>; rel=\"next\"";
        let next = parse_next_link(header).unwrap();
        assert!(next.contains("page_info=def"));
    }

    #[test]
    fn missing_next_rel_yields_none() {
        let header = "<https://shop.example.com/x>; rel=\"previous\"";
        assert_eq!(parse_next_link(header), None);
        assert_eq!(parse_next_link(""), None);
    }

    #[test]
    fn page_payload_deserializes() {
        let body = serde_json::json!({
            "products": [{
                "id": 42,
                "title": "Linen Shirt",
                "body_html": "<p>Soft</p>",
                "vendor": "Acme",
                "product_type": "Shirts",
                "handle": "linen-shirt",
                "images": [{"id": 1, "src": "https://cdn.example.com/a.png"}],
                "variants": [{
                    "id": 7,
                    "title": "M / Blue",
                    "sku": "LS-M-BLUE",
                    "price": "19.99",
                    "inventory_quantity": 3,
                    "image_id": 1,
                    "option1": "M",
                    "option2": "Blue",
                    "option3": null
                }]
            }]
        });
        let page: ProductsPage = serde_json::from_value(body).unwrap();
        assert_eq!(page.products.len(), 1);
        let product = &page.products[0];
        assert_eq!(product.id, 42);
        assert_eq!(product.variants[0].image_id, Some(1));
    }

    #[test]
    fn price_parsing_tolerates_garbage() {
        assert_eq!(parse_price(Some("19.99")), dec!(19.99));
        assert_eq!(parse_price(Some("not a number")), Decimal::ZERO);
        assert_eq!(parse_price(None), Decimal::ZERO);
    }

    #[test]
    fn attributes_carry_the_three_options() {
        let remote = RemoteVariant {
            id: 1,
            title: None,
            sku: None,
            price: None,
            inventory_quantity: None,
            image_id: None,
            option1: Some("M".into()),
            option2: None,
            option3: None,
        };
        let attrs = variant_attributes(&remote);
        assert_eq!(attrs["option1"], "M");
        assert!(attrs["option2"].is_null());
    }
}
