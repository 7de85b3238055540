//! Storage clients. Each store is a cheap-to-clone struct holding a pool
//! handle and is constructed explicitly at startup; there is no process-wide
//! pool singleton.

mod cart;
mod catalog;
mod orders;
mod users;

pub use cart::CartStore;
pub use catalog::{CatalogStore, ProductInput};
pub use orders::{OrderLine, OrderStore};
pub use users::{NewUser, UserStore};

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::AppConfig;

/// Builds the shared pool. The acquire timeout is the per-request timeout at
/// the storage boundary.
pub async fn connect(config: &AppConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.db_pool_max)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&config.database_url)
        .await
}
