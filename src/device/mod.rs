//! Device lookup for the relay engine.
//!
//! The relay wants the device's row id, but requests only carry the
//! client-chosen device identifier. Backends translate one into the other.

mod factory;
mod memory_backend;
mod postgres_backend;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::PushError;

pub use factory::create_device_repository;
pub use memory_backend::MemoryDeviceRepository;
pub use postgres_backend::PostgresDeviceRepository;

#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Row id of the device registered under `identifier`.
    ///
    /// `Ok(None)` when no device matches; `Err` only when the backend
    /// itself fails.
    async fn get_id_by_identifier(&self, identifier: &str) -> Result<Option<Uuid>, PushError>;
}
