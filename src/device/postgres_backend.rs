//! PostgreSQL-backed device lookup.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::error::PushError;

use super::DeviceRepository;

/// Reads device ids from the `device` table.
///
/// Table structure (columns used):
/// - `id` - uuid primary key
/// - `identifier` - client-generated device identifier
pub struct PostgresDeviceRepository {
    pool: PgPool,
}

impl PostgresDeviceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a lazily connecting pool from configuration.
    pub fn connect_lazy(config: &DatabaseConfig, url: &str) -> Result<Self, PushError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect_lazy(url)
            .map_err(|e| PushError::Config(format!("invalid database URL: {}", e)))?;

        tracing::info!(pool_size = config.pool_size, "PostgreSQL device pool created");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DeviceRepository for PostgresDeviceRepository {
    async fn get_id_by_identifier(&self, identifier: &str) -> Result<Option<Uuid>, PushError> {
        let id: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM device WHERE identifier = $1 LIMIT 1")
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await?;

        Ok(id)
    }
}
