//! Queue-backed engine: one JSON envelope per queue message.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::PushError;
use crate::queue::QueueClient;

use super::engine::PushEngine;
use super::types::{PushMessage, PushTarget};

/// Writes the serialized envelope to a queue. Addressing is left to the
/// queue consumer, which reads it back out of the payload.
pub struct AzureQueuePushEngine {
    queue: Arc<dyn QueueClient>,
}

impl AzureQueuePushEngine {
    pub fn new(queue: Arc<dyn QueueClient>) -> Self {
        Self { queue }
    }

    #[tracing::instrument(
        name = "push.azure_queue",
        skip(self, message),
        fields(
            target_kind = target.kind(),
            push_type = %message.push_type(),
            backend = self.queue.backend()
        )
    )]
    async fn enqueue(&self, target: PushTarget, message: PushMessage) -> Result<(), PushError> {
        let text = serde_json::to_string(&message.envelope)?;
        self.queue.send_message(&text).await?;

        tracing::debug!(bytes = text.len(), "Push enqueued");
        Ok(())
    }
}

#[async_trait]
impl PushEngine for AzureQueuePushEngine {
    fn name(&self) -> &'static str {
        "azure_queue"
    }

    async fn send_to_user(&self, user_id: Uuid, message: PushMessage) -> Result<(), PushError> {
        self.enqueue(PushTarget::User(user_id), message).await
    }

    async fn send_to_organization(
        &self,
        organization_id: Uuid,
        message: PushMessage,
    ) -> Result<(), PushError> {
        self.enqueue(PushTarget::Organization(organization_id), message)
            .await
    }

    async fn send_to_installation(
        &self,
        installation_id: Uuid,
        message: PushMessage,
    ) -> Result<(), PushError> {
        self.enqueue(PushTarget::Installation(installation_id), message)
            .await
    }
}
