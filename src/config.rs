//! Environment-driven configuration, collected once at startup.

use anyhow::{bail, Result};

const DEFAULT_AUTH_SECRET: &str = "change-me-storefront-secret";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_pool_max: u32,
    pub auth_secret: String,
    pub auth_token_ttl_hours: i64,
    pub nats_url: Option<String>,
    pub production: bool,
}

impl AppConfig {
    /// Reads configuration from the environment, falling back to development
    /// defaults. Refuses to start in production with the default auth secret.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8083);
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => bail!("DATABASE_URL must be set"),
        };
        let db_pool_max = std::env::var("DB_POOL_MAX")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);
        let auth_secret =
            std::env::var("AUTH_SECRET").unwrap_or_else(|_| DEFAULT_AUTH_SECRET.to_string());
        let auth_token_ttl_hours = std::env::var("AUTH_TOKEN_TTL_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(24);
        let nats_url = std::env::var("NATS_URL").ok();
        let production = std::env::var("APP_ENV")
            .map(|e| e == "production")
            .unwrap_or(false);

        if production && auth_secret == DEFAULT_AUTH_SECRET {
            bail!("AUTH_SECRET must be set to a unique value in production");
        }

        Ok(Self {
            host,
            port,
            database_url,
            db_pool_max,
            auth_secret,
            auth_token_ttl_hours,
            nats_url,
            production,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
