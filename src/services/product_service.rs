use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::products::{
        CreateProductRequest, ProductDetail, ProductList, UpdateProductRequest, VariantInput,
    },
    entity::{
        product_images::{
            ActiveModel as ImageActive, Column as ImageCol, Entity as ProductImages,
            Model as ImageModel,
        },
        product_variants::{
            ActiveModel as VariantActive, Column as VariantCol, Entity as ProductVariants,
        },
        products::{
            ActiveModel as ProductActive, Column as ProdCol, Entity as Products,
            Model as ProductModel,
        },
    },
    error::{AppError, AppResult, validation_map},
    media,
    response::{ApiResponse, Meta},
    routes::params::ProductQuery,
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, per_page, offset) = query.pagination().normalize();

    let mut condition = Condition::all().add(ProdCol::DeletedAt.is_null());
    if let Some(brand) = query.brand.as_ref().filter(|b| !b.is_empty()) {
        condition = condition.add(ProdCol::Brand.like(format!("%{brand}%")));
    }
    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(ProdCol::Name.like(format!("%{search}%")));
    }

    let finder = Products::find()
        .filter(condition)
        .order_by_desc(ProdCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let products = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let details = load_product_details(&state.orm, products).await?;
    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items: details },
        Some(meta),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductDetail>> {
    let product = find_live_product(&state.orm, id).await?;
    let mut detail = load_product_details(&state.orm, vec![product])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;

    // Locally stored files are returned inline as data URIs; remote URLs
    // pass through unchanged.
    for image in &mut detail.images {
        image.image_path = media::to_display_path(&state.config.media_root, &image.image_path).await;
    }

    Ok(ApiResponse::success("Product", detail, Some(Meta::empty())))
}

pub async fn create_product(
    state: &AppState,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    validate_product_payload(payload.validate().err().as_ref(), &payload.variants)?;

    let txn = state.orm.begin().await?;

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        shopify_id: Set(None),
        name: Set(payload.name),
        description: Set(payload.description),
        brand: Set(payload.brand),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    }
    .insert(&txn)
    .await?;

    ingest_images(&txn, &state.config.media_root, product.id, &payload.images).await?;
    insert_variants(&txn, product.id, &payload.variants).await?;

    txn.commit().await?;

    let detail = load_product_details(&state.orm, vec![product])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Product created successfully",
        detail,
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    if let Some(variants) = &payload.variants {
        validate_product_payload(payload.validate().err().as_ref(), variants)?;
    } else {
        validate_product_payload(payload.validate().err().as_ref(), &[])?;
    }

    let txn = state.orm.begin().await?;
    let product = find_live_product(&txn, id).await?;

    let mut active: ProductActive = product.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(brand) = payload.brand {
        active.brand = Set(Some(brand));
    }
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&txn).await?;

    if let Some(images) = &payload.images {
        let old_images = ProductImages::find()
            .filter(ImageCol::ProductId.eq(product.id))
            .all(&txn)
            .await?;
        ProductImages::delete_many()
            .filter(ImageCol::ProductId.eq(product.id))
            .exec(&txn)
            .await?;
        for old in &old_images {
            media::remove_image(&state.config.media_root, &old.image_path).await;
        }
        ingest_images(&txn, &state.config.media_root, product.id, images).await?;
    }

    if let Some(variants) = &payload.variants {
        ProductVariants::delete_many()
            .filter(VariantCol::ProductId.eq(product.id))
            .exec(&txn)
            .await?;
        insert_variants(&txn, product.id, variants).await?;
    }

    txn.commit().await?;

    let detail = load_product_details(&state.orm, vec![product])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Product updated successfully",
        detail,
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    let product = find_live_product(&txn, id).await?;

    let images = ProductImages::find()
        .filter(ImageCol::ProductId.eq(product.id))
        .all(&txn)
        .await?;
    ProductImages::delete_many()
        .filter(ImageCol::ProductId.eq(product.id))
        .exec(&txn)
        .await?;
    ProductVariants::delete_many()
        .filter(VariantCol::ProductId.eq(product.id))
        .exec(&txn)
        .await?;

    let mut active: ProductActive = product.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.update(&txn).await?;

    txn.commit().await?;

    for image in &images {
        media::remove_image(&state.config.media_root, &image.image_path).await;
    }

    Ok(ApiResponse::success(
        "Product deleted successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn validate_product_payload(
    derive_errors: Option<&validator::ValidationErrors>,
    variants: &[VariantInput],
) -> AppResult<()> {
    let mut errors = derive_errors.map(validation_map).unwrap_or_default();
    for (index, variant) in variants.iter().enumerate() {
        if variant.product_price.is_some_and(|p| p < Decimal::ZERO) {
            errors.insert(
                format!("variants.{index}.product_price"),
                "The product_price must not be negative.".into(),
            );
        }
        if variant.product_cost.is_some_and(|c| c < Decimal::ZERO) {
            errors.insert(
                format!("variants.{index}.product_cost"),
                "The product_cost must not be negative.".into(),
            );
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

async fn find_live_product<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<ProductModel> {
    Products::find()
        .filter(
            Condition::all()
                .add(ProdCol::Id.eq(id))
                .add(ProdCol::DeletedAt.is_null()),
        )
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

/// Store each incoming image (URL or data URI) and record it; index 0 is the
/// main image.
async fn ingest_images<C: ConnectionTrait>(
    conn: &C,
    media_root: &str,
    product_id: Uuid,
    images: &[String],
) -> AppResult<()> {
    for (index, raw) in images.iter().enumerate() {
        let image_path = media::store_image(media_root, raw).await?;
        ImageActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            product_variant_id: Set(None),
            image_path: Set(image_path),
            is_main: Set(index == 0),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

async fn insert_variants<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    variants: &[VariantInput],
) -> AppResult<()> {
    for variant in variants {
        VariantActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            name: Set(variant.name.clone()),
            sku: Set(variant.sku.clone()),
            product_price: Set(variant.product_price),
            product_cost: Set(variant.product_cost),
            stock: Set(variant.stock.unwrap_or(0)),
            attributes: Set(variant
                .attributes
                .clone()
                .unwrap_or_else(|| serde_json::json!({}))),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

pub async fn load_product_details<C: ConnectionTrait>(
    conn: &C,
    products: Vec<ProductModel>,
) -> AppResult<Vec<ProductDetail>> {
    if products.is_empty() {
        return Ok(Vec::new());
    }

    let product_ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
    let variants = ProductVariants::find()
        .filter(VariantCol::ProductId.is_in(product_ids.clone()))
        .all(conn)
        .await?;
    let images: Vec<ImageModel> = ProductImages::find()
        .filter(ImageCol::ProductId.is_in(product_ids))
        .all(conn)
        .await?;

    let mut variants_by_product: HashMap<Uuid, Vec<_>> = HashMap::new();
    for variant in variants {
        variants_by_product
            .entry(variant.product_id)
            .or_default()
            .push(variant);
    }
    let mut images_by_product: HashMap<Uuid, Vec<_>> = HashMap::new();
    for image in images {
        images_by_product
            .entry(image.product_id)
            .or_default()
            .push(image);
    }

    Ok(products
        .into_iter()
        .map(|product| {
            let variants = variants_by_product
                .remove(&product.id)
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect();
            let images = images_by_product
                .remove(&product.id)
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect();
            ProductDetail {
                product: product.into(),
                variants,
                images,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn variant(price: Decimal, cost: Decimal) -> VariantInput {
        VariantInput {
            name: None,
            sku: None,
            product_price: Some(price),
            product_cost: Some(cost),
            stock: None,
            attributes: None,
        }
    }

    #[test]
    fn negative_prices_are_rejected_together() {
        let variants = vec![variant(dec!(-1), dec!(5)), variant(dec!(3), dec!(-2))];
        let err = validate_product_payload(None, &variants).unwrap_err();
        match err {
            AppError::Validation(map) => {
                assert!(map.contains_key("variants.0.product_price"));
                assert!(map.contains_key("variants.1.product_cost"));
                assert_eq!(map.len(), 2);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn zero_prices_are_fine() {
        let variants = vec![variant(dec!(0), dec!(0))];
        assert!(validate_product_payload(None, &variants).is_ok());
    }
}
