//! Relay engine: hands pushes to the hosted push relay over HTTPS.
//!
//! Self-hosted installations cannot reach mobile push providers directly;
//! the relay does that on their behalf. Each request carries the resolved
//! originating device so the relay can skip it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::device::DeviceRepository;
use crate::error::PushError;
use crate::metrics::DeviceLookupMetrics;

use super::auth::TokenProvider;
use super::context::CurrentContext;
use super::engine::PushEngine;
use super::http::post_json;
use super::types::{ClientType, PushMessage, PushPayload, PushTarget, PushType};

/// Body of `POST /push/send`. Every field is always present; unset ones
/// are sent as `null`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RelayPushRequest<'a> {
    pub user_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    pub device_id: Option<Uuid>,
    pub identifier: Option<&'a str>,
    #[serde(rename = "Type")]
    pub push_type: PushType,
    pub payload: &'a PushPayload,
    pub client_type: Option<ClientType>,
    pub installation_id: Option<Uuid>,
}

impl<'a> RelayPushRequest<'a> {
    fn new(target: PushTarget, device_id: Option<Uuid>, message: &'a PushMessage) -> Self {
        let (user_id, organization_id, installation_id) = match target {
            PushTarget::User(id) => (Some(id), None, None),
            PushTarget::Organization(id) => (None, Some(id), None),
            PushTarget::Installation(id) => (None, None, Some(id)),
        };

        Self {
            user_id,
            organization_id,
            device_id,
            identifier: message.envelope.context_id.as_deref(),
            push_type: message.envelope.push_type,
            payload: &message.envelope.payload,
            client_type: message.client_type,
            installation_id,
        }
    }
}

pub struct RelayPushEngine {
    http: reqwest::Client,
    token: Arc<TokenProvider>,
    devices: Arc<dyn DeviceRepository>,
    context: Arc<dyn CurrentContext>,
    send_uri: String,
}

impl RelayPushEngine {
    pub fn new(
        http: reqwest::Client,
        token: Arc<TokenProvider>,
        devices: Arc<dyn DeviceRepository>,
        context: Arc<dyn CurrentContext>,
        base_uri: &str,
    ) -> Self {
        Self {
            http,
            token,
            devices,
            context,
            send_uri: format!("{}/push/send", base_uri.trim_end_matches('/')),
        }
    }

    pub fn send_uri(&self) -> &str {
        &self.send_uri
    }

    /// Row id of the device that made the current request, if it is known.
    async fn resolve_device(&self) -> Result<Option<Uuid>, PushError> {
        let Some(identifier) = self.context.device_identifier() else {
            DeviceLookupMetrics::record_skipped();
            return Ok(None);
        };

        match self.devices.get_id_by_identifier(&identifier).await? {
            Some(id) => {
                DeviceLookupMetrics::record_hit();
                Ok(Some(id))
            }
            None => {
                DeviceLookupMetrics::record_miss();
                tracing::warn!(identifier = %identifier, "No device registered for identifier");
                Ok(None)
            }
        }
    }

    #[tracing::instrument(
        name = "push.relay",
        skip(self, message),
        fields(target_kind = target.kind(), push_type = %message.push_type())
    )]
    async fn deliver(&self, target: PushTarget, message: PushMessage) -> Result<(), PushError> {
        let device_id = self.resolve_device().await?;
        let request = RelayPushRequest::new(target, device_id, &message);

        let token = self.token.access_token().await?;
        post_json(&self.http, &self.send_uri, &token, &request).await?;

        tracing::debug!(device_id = ?device_id, "Push accepted by relay");
        Ok(())
    }
}

#[async_trait]
impl PushEngine for RelayPushEngine {
    fn name(&self) -> &'static str {
        "relay"
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
