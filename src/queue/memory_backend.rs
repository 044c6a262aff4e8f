//! In-process queue for development and tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::PushError;

use super::QueueClient;

/// Keeps every message in arrival order.
#[derive(Debug, Default)]
pub struct MemoryQueueClient {
    messages: Mutex<Vec<String>>,
}

impl MemoryQueueClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the messages written so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl QueueClient for MemoryQueueClient {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn send_message(&self, message: &str) -> Result<(), PushError> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_messages_kept_in_order() {
        let queue = MemoryQueueClient::new();
        assert!(queue.is_empty());

        queue.send_message("first").await.unwrap();
        queue.send_message("second").await.unwrap();

        assert_eq!(queue.messages(), vec!["first", "second"]);
    }
}
