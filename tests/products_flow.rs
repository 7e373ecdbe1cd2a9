use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use orderdesk_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::products::{CreateProductRequest, VariantInput},
    media::PUBLIC_PREFIX,
    services::product_service,
    state::AppState,
};
use rust_decimal_macros::dec;
use uuid::Uuid;

// Product intake with mixed image sources: a base64 upload first, then
// remote URLs. Only the first image becomes the main one.
#[tokio::test]
async fn first_product_image_is_flagged_as_main() -> anyhow::Result<()> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let media_dir = tempfile::tempdir()?;
    let state = setup_state(&database_url, media_dir.path().to_str().unwrap()).await?;

    let upload = format!("data:image/png;base64,{}", BASE64.encode(b"main-pixels"));
    let gallery_url = format!("https://cdn.example.com/{}.png", Uuid::new_v4());
    let payload = CreateProductRequest {
        name: format!("Main Image Widget {}", Uuid::new_v4()),
        description: None,
        brand: Some("ImageBrand".into()),
        images: vec![upload, gallery_url.clone(), gallery_url.replace(".png", "-alt.png")],
        variants: vec![VariantInput {
            name: Some("Default".into()),
            sku: Some(format!("SKU-{}", Uuid::new_v4())),
            product_price: Some(dec!(10)),
            product_cost: Some(dec!(6)),
            stock: Some(1),
            attributes: None,
        }],
    };

    let detail = product_service::create_product(&state, payload)
        .await?
        .data
        .expect("product detail");
    assert_eq!(detail.images.len(), 3);

    // The uploaded image landed first, so it carries the main flag; the
    // remote gallery URLs do not.
    let stored = detail
        .images
        .iter()
        .find(|i| i.image_path.starts_with(PUBLIC_PREFIX))
        .expect("stored upload");
    assert!(stored.is_main);
    for image in detail.images.iter().filter(|i| i.id != stored.id) {
        assert!(image.image_path.starts_with("https://"));
        assert!(!image.is_main);
    }

    Ok(())
}

async fn setup_state(database_url: &str, media_root: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;
    Ok(AppState {
        orm,
        config: AppConfig {
            database_url: database_url.to_string(),
            host: "127.0.0.1".into(),
            port: 0,
            media_root: media_root.to_string(),
        },
    })
}
