use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Utc;
use orderdesk_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{product_variants, products, users},
};
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let admin_id = ensure_user(&orm, "admin@example.com", "admin123", "admin").await?;
    let user_id = ensure_user(&orm, "user@example.com", "user123", "user").await?;
    seed_products(&orm).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(orm)
        .await?
    {
        println!("User {email} already present");
        return Ok(existing.id);
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let model = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        role: Set(role.to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(orm)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(model.id)
}

async fn seed_products(orm: &DatabaseConnection) -> anyhow::Result<()> {
    let samples = [
        ("Linen Shirt", "Shein", dec!(24.90), dec!(11.20), 40),
        ("Denim Jacket", "Shein", dec!(49.50), dec!(22.00), 25),
        ("Canvas Tote", "Romwe", dec!(14.00), dec!(5.50), 120),
    ];

    for (name, brand, price, cost, stock) in samples {
        let existing = products::Entity::find()
            .filter(products::Column::Name.eq(name))
            .filter(products::Column::DeletedAt.is_null())
            .one(orm)
            .await?;
        if existing.is_some() {
            continue;
        }

        let now = Utc::now();
        let product = products::ActiveModel {
            id: Set(Uuid::new_v4()),
            shopify_id: Set(None),
            name: Set(name.to_string()),
            description: Set(None),
            brand: Set(Some(brand.to_string())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        }
        .insert(orm)
        .await?;

        product_variants::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product.id),
            name: Set(Some("Default".to_string())),
            sku: Set(None),
            product_price: Set(Some(price)),
            product_cost: Set(Some(cost)),
            stock: Set(stock),
            attributes: Set(serde_json::json!({})),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
