//! Transport abstraction for push delivery.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::PushError;

use super::types::{PushMessage, PushTarget};

/// A push transport.
///
/// Engines only implement the three delivery primitives; the typed push
/// operations live once in [`super::PushNotificationService`].
///
/// # Failure model
///
/// Each call performs at most one delivery. Engines never retry and never
/// swallow a failure: the error is returned to the caller unchanged.
#[async_trait]
pub trait PushEngine: Send + Sync {
    /// Short engine name used in logs and metric labels.
    fn name(&self) -> &'static str;

    async fn send_to_user(&self, user_id: Uuid, message: PushMessage) -> Result<(), PushError>;

    async fn send_to_organization(
        &self,
        organization_id: Uuid,
        message: PushMessage,
    ) -> Result<(), PushError>;

    async fn send_to_installation(
        &self,
        installation_id: Uuid,
        message: PushMessage,
    ) -> Result<(), PushError>;

    /// Route `message` to the primitive matching `target`.
    async fn send(&self, target: PushTarget, message: PushMessage) -> Result<(), PushError> {
        match target {
            PushTarget::User(id) => self.send_to_user(id, message).await,
            PushTarget::Organization(id) => self.send_to_organization(id, message).await,
            PushTarget::Installation(id) => self.send_to_installation(id, message).await,
        }
    }
}

/// Engine used when push delivery is switched off.
#[derive(Debug, Default)]
pub struct NoopPushEngine;

impl NoopPushEngine {
    fn skip(&self, target: PushTarget, message: &PushMessage) {
        tracing::debug!(
            target_kind = target.kind(),
            push_type = %message.push_type(),
            "Push delivery disabled, dropping message"
        );
    }
}

#[async_trait]
impl PushEngine for NoopPushEngine {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn send_to_user(&self, user_id: Uuid, message: PushMessage) -> Result<(), PushError> {
        self.skip(PushTarget::User(user_id), &message);
        Ok(())
    }

    async fn send_to_organization(
        &self,
        organization_id: Uuid,
        message: PushMessage,
    ) -> Result<(), PushError> {
        self.skip(PushTarget::Organization(organization_id), &message);
        Ok(())
    }

    async fn send_to_installation(
        &self,
        installation_id: Uuid,
        message: PushMessage,
    ) -> Result<(), PushError> {
        self.skip(PushTarget::Installation(installation_id), &message);
        Ok(())
    }
}
