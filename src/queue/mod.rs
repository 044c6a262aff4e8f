//! Outbound queues for the Azure Queue push engine.
//!
//! The engine writes one serialized envelope per push; a separate
//! notifications hub consumes the queue and fans the message out.

mod azure_backend;
mod factory;
mod memory_backend;
mod redis_backend;

use async_trait::async_trait;

use crate::error::PushError;

pub use azure_backend::AzureStorageQueueClient;
pub use factory::create_queue_client;
pub use memory_backend::MemoryQueueClient;
pub use redis_backend::RedisQueueClient;

/// A queue that accepts text messages.
///
/// Implementations perform a single enqueue per call and report any
/// failure as [`PushError::Transport`].
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Backend name for logs.
    fn backend(&self) -> &'static str;

    async fn send_message(&self, message: &str) -> Result<(), PushError>;
}
