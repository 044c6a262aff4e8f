//! Queue client factory

use std::sync::Arc;

use crate::config::QueueConfig;
use crate::error::PushError;

use super::azure_backend::AzureStorageQueueClient;
use super::memory_backend::MemoryQueueClient;
use super::redis_backend::RedisQueueClient;
use super::QueueClient;

/// Create the queue client named by `settings.backend`:
/// - `"azure"`: requires `azure_queue_url`
/// - `"redis"`: `RPUSH` onto `redis_key`
/// - `"memory"`: in-process, for development
///
/// Any other value is a configuration error.
pub fn create_queue_client(
    settings: &QueueConfig,
    http: reqwest::Client,
) -> Result<Arc<dyn QueueClient>, PushError> {
    match settings.backend.as_str() {
        "azure" => {
            let url = settings.azure_queue_url.as_deref().ok_or_else(|| {
                PushError::Config("queue.azure_queue_url is required for the azure backend".to_string())
            })?;
            tracing::info!(backend = "azure", "Creating Azure Storage queue client");
            Ok(Arc::new(AzureStorageQueueClient::new(http, url)?))
        }
        "redis" => {
            tracing::info!(
                backend = "redis",
                key = %settings.redis_key,
                "Creating Redis queue client"
            );
            Ok(Arc::new(RedisQueueClient::new(
                &settings.redis_url,
                settings.redis_key.clone(),
            )?))
        }
        "memory" => {
            tracing::info!(backend = "memory", "Creating memory queue client");
            Ok(Arc::new(MemoryQueueClient::new()))
        }
        other => Err(PushError::Config(format!("unknown queue backend: {}", other))),
    }
}
