use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub media_root: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let media_root = env::var("MEDIA_ROOT").unwrap_or_else(|_| "uploads/products".to_string());
        Ok(Self {
            database_url,
            host,
            port,
            media_root,
        })
    }
}

/// Settings for the Shopify catalog pull, read separately so the HTTP server
/// can start without them.
#[derive(Debug, Clone)]
pub struct ShopifyConfig {
    pub store_url: String,
    pub api_version: String,
    pub access_token: String,
    pub page_size: u32,
    pub max_pages: u32,
    pub page_delay_ms: u64,
}

impl ShopifyConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store_url = env::var("SHOPIFY_STORE_URL")?;
        let api_version = env::var("SHOPIFY_API_VERSION").unwrap_or_else(|_| "2024-01".to_string());
        let access_token = env::var("SHOPIFY_ACCESS_TOKEN")?;
        let page_size = env::var("SHOPIFY_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(250);
        let max_pages = env::var("SHOPIFY_MAX_PAGES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);
        let page_delay_ms = env::var("SHOPIFY_PAGE_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(500);
        Ok(Self {
            store_url,
            api_version,
            access_token,
            page_size,
            max_pages,
            page_delay_ms,
        })
    }

    pub fn first_page_url(&self) -> String {
        format!(
            "https://{}/admin/api/{}/products.json?limit={}",
            self.store_url, self.api_version, self.page_size
        )
    }
}
