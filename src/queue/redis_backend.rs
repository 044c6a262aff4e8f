//! Redis list used as the push queue.

use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use tokio::sync::RwLock;

use async_trait::async_trait;

use crate::error::PushError;

use super::QueueClient;

/// Appends messages to a Redis list with `RPUSH`.
///
/// The multiplexed connection is opened on first use and shared by all
/// tasks afterwards.
pub struct RedisQueueClient {
    client: Client,
    key: String,
    connection: RwLock<Option<MultiplexedConnection>>,
}

impl RedisQueueClient {
    pub fn new(url: &str, key: impl Into<String>) -> Result<Self, PushError> {
        let client = Client::open(url)
            .map_err(|e| PushError::Config(format!("invalid Redis URL: {}", e)))?;

        Ok(Self {
            client,
            key: key.into(),
            connection: RwLock::new(None),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    async fn get_connection(&self) -> Result<MultiplexedConnection, PushError> {
        {
            let conn = self.connection.read().await;
            if let Some(ref c) = *conn {
                return Ok(c.clone());
            }
        }

        let mut conn_guard = self.connection.write().await;

        // Double-check in case another task connected while we waited
        if let Some(ref c) = *conn_guard {
            return Ok(c.clone());
        }

        let conn = self.client.get_multiplexed_tokio_connection().await?;
        *conn_guard = Some(conn.clone());
        tracing::info!(key = %self.key, "Redis queue connection established");
        Ok(conn)
    }

    async fn reset_connection(&self) {
        *self.connection.write().await = None;
    }
}

#[async_trait]
impl QueueClient for RedisQueueClient {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn send_message(&self, message: &str) -> Result<(), PushError> {
        let mut conn = self.get_connection().await?;

        let result: redis::RedisResult<i64> = conn.rpush(&self.key, message).await;
        match result {
            Ok(length) => {
                tracing::debug!(key = %self.key, length, "Message pushed to Redis queue");
                Ok(())
            }
            Err(e) => {
                if e.is_io_error() || e.is_connection_dropped() {
                    self.reset_connection().await;
                }
                Err(e.into())
            }
        }
    }
}
