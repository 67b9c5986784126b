pub mod repository;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::config::{DbConfig, PoolConfig};

pub use repository::{BuildingStore, PgBuildingStore, StoreError};

pub async fn create_pool(db: &DbConfig, pool: &PoolConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .min_connections(pool.min_connections)
        .max_connections(pool.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&db.connection_string())
        .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(pool)
}
