//! Engine that forwards envelopes to the internal notifications service.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::PushError;

use super::auth::TokenProvider;
use super::engine::PushEngine;
use super::http::post_json;
use super::types::{PushMessage, PushTarget};

/// POSTs the bare envelope to `{base}/send`. The receiving service owns
/// fan-out and uses `ContextId` for self-exclusion.
pub struct NotificationsApiPushEngine {
    http: reqwest::Client,
    token: Arc<TokenProvider>,
    send_uri: String,
}

impl NotificationsApiPushEngine {
    pub fn new(http: reqwest::Client, token: Arc<TokenProvider>, base_uri: &str) -> Self {
        Self {
            http,
            token,
            send_uri: format!("{}/send", base_uri.trim_end_matches('/')),
        }
    }

    pub fn send_uri(&self) -> &str {
        &self.send_uri
    }

    #[tracing::instrument(
        name = "push.notifications_api",
        skip(self, message),
        fields(target_kind = target.kind(), push_type = %message.push_type())
    )]
    async fn deliver(&self, target: PushTarget, message: PushMessage) -> Result<(), PushError> {
        let token = self.token.access_token().await?;
        post_json(&self.http, &self.send_uri, &token, &message.envelope).await?;

        tracing::debug!("Push accepted by notifications service");
        Ok(())
    }
}

#[async_trait]
impl PushEngine for NotificationsApiPushEngine {
    fn name(&self) -> &'static str {
        "notifications_api"
    }

    async fn send_to_user(&self, user_id: Uuid, message: PushMessage) -> Result<(), PushError> {
        self.deliver(PushTarget::User(user_id), message).await
    }

    async fn send_to_organization(
        &self,
        organization_id: Uuid,
        message: PushMessage,
    ) -> Result<(), PushError> {
        self.deliver(PushTarget::Organization(organization_id), message)
            .await
    }

    async fn send_to_installation(
        &self,
        installation_id: Uuid,
        message: PushMessage,
    ) -> Result<(), PushError> {
        self.deliver(PushTarget::Installation(installation_id), message)
            .await
    }
}
