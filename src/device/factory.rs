//! Device repository factory

use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::error::PushError;

use super::memory_backend::MemoryDeviceRepository;
use super::postgres_backend::PostgresDeviceRepository;
use super::DeviceRepository;

/// PostgreSQL when `database.url` is set, otherwise an empty in-memory
/// registry (every lookup misses).
pub fn create_device_repository(
    config: &DatabaseConfig,
) -> Result<Arc<dyn DeviceRepository>, PushError> {
    match config.url.as_deref() {
        Some(url) if !url.is_empty() => {
            tracing::info!(backend = "postgres", "Creating PostgreSQL device repository");
            Ok(Arc::new(PostgresDeviceRepository::connect_lazy(config, url)?))
        }
        _ => {
            tracing::warn!(
                backend = "memory",
                "No database configured, device lookups will always miss"
            );
            Ok(Arc::new(MemoryDeviceRepository::new()))
        }
    }
}
