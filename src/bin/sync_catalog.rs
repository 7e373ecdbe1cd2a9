use orderdesk_api::{
    config::{AppConfig, ShopifyConfig},
    db::{create_orm_conn, run_migrations},
    services::shopify_sync,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,orderdesk_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let shopify = ShopifyConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let stats = shopify_sync::run_sync(&orm, &shopify).await?;
    tracing::info!(
        pages = stats.pages,
        products = stats.products,
        variants = stats.variants,
        images = stats.images,
        "catalog sync finished"
    );

    Ok(())
}
