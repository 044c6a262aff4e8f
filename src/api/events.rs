//! Domain event intake.
//!
//! Other services report vault, auth and admin events here; each event maps
//! onto exactly one push operation.

use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PushError, Result};
use crate::push::{
    AuthRequest, Cipher, Folder, LogOutReason, Notification, NotificationStatus, Organization,
    PushNotificationService, PushType, RequestContext, Send,
};
use crate::server::{device_identifier, AppState};

/// Event body of `POST /api/v1/events`, tagged by `event`.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PushEvent {
    /// Cipher mutation with the push type chosen at runtime
    CipherChanged {
        cipher: Cipher,
        push_type: PushType,
        #[serde(default)]
        collection_ids: Option<Vec<Uuid>>,
    },
    CipherCreated {
        cipher: Cipher,
        #[serde(default)]
        collection_ids: Vec<Uuid>,
    },
    CipherUpdated {
        cipher: Cipher,
        #[serde(default)]
        collection_ids: Vec<Uuid>,
    },
    CipherDeleted {
        cipher: Cipher,
    },
    FolderCreated {
        folder: Folder,
    },
    FolderUpdated {
        folder: Folder,
    },
    FolderDeleted {
        folder: Folder,
    },
    SyncCiphers {
        user_id: Uuid,
    },
    SyncVault {
        user_id: Uuid,
    },
    SyncOrganizations {
        user_id: Uuid,
    },
    SyncOrgKeys {
        user_id: Uuid,
    },
    SyncSettings {
        user_id: Uuid,
    },
    RefreshSecurityTasks {
        user_id: Uuid,
    },
    LogOut {
        user_id: Uuid,
        #[serde(default)]
        exclude_current_context: bool,
        #[serde(default)]
        reason: Option<LogOutReason>,
    },
    SendCreated {
        send: Send,
    },
    SendUpdated {
        send: Send,
    },
    SendDeleted {
        send: Send,
    },
    AuthRequestCreated {
        auth_request: AuthRequest,
    },
    AuthRequestResponded {
        auth_request: AuthRequest,
    },
    NotificationCreated {
        notification: Notification,
    },
    NotificationStatusChanged {
        notification: Notification,
        #[serde(default)]
        status: NotificationStatus,
    },
    OrganizationStatusChanged {
        organization: Organization,
    },
    OrganizationCollectionSettingsChanged {
        organization: Organization,
    },
}

impl PushEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PushEvent::CipherChanged { .. } => "cipher_changed",
            PushEvent::CipherCreated { .. } => "cipher_created",
            PushEvent::CipherUpdated { .. } => "cipher_updated",
            PushEvent::CipherDeleted { .. } => "cipher_deleted",
            PushEvent::FolderCreated { .. } => "folder_created",
            PushEvent::FolderUpdated { .. } => "folder_updated",
            PushEvent::FolderDeleted { .. } => "folder_deleted",
            PushEvent::SyncCiphers { .. } => "sync_ciphers",
            PushEvent::SyncVault { .. } => "sync_vault",
            PushEvent::SyncOrganizations { .. } => "sync_organizations",
            PushEvent::SyncOrgKeys { .. } => "sync_org_keys",
            PushEvent::SyncSettings { .. } => "sync_settings",
            PushEvent::RefreshSecurityTasks { .. } => "refresh_security_tasks",
            PushEvent::LogOut { .. } => "log_out",
            PushEvent::SendCreated { .. } => "send_created",
            PushEvent::SendUpdated { .. } => "send_updated",
            PushEvent::SendDeleted { .. } => "send_deleted",
            PushEvent::AuthRequestCreated { .. } => "auth_request_created",
            PushEvent::AuthRequestResponded { .. } => "auth_request_responded",
            PushEvent::NotificationCreated { .. } => "notification_created",
            PushEvent::NotificationStatusChanged { .. } => "notification_status_changed",
            PushEvent::OrganizationStatusChanged { .. } => "organization_status_changed",
            PushEvent::OrganizationCollectionSettingsChanged { .. } => {
                "organization_collection_settings_changed"
            }
        }
    }

    /// Run the push operation for this event.
    pub async fn dispatch(
        self,
        push: &PushNotificationService,
    ) -> std::result::Result<(), PushError> {
        match self {
            PushEvent::CipherChanged {
                cipher,
                push_type,
                collection_ids,
            } => push.push_cipher(&cipher, push_type, collection_ids).await,
            PushEvent::CipherCreated {
                cipher,
                collection_ids,
            } => push.push_sync_cipher_create(&cipher, collection_ids).await,
            PushEvent::CipherUpdated {
                cipher,
                collection_ids,
            } => push.push_sync_cipher_update(&cipher, collection_ids).await,
            PushEvent::CipherDeleted { cipher } => push.push_sync_cipher_delete(&cipher).await,
            PushEvent::FolderCreated { folder } => push.push_sync_folder_create(&folder).await,
            PushEvent::FolderUpdated { folder } => push.push_sync_folder_update(&folder).await,
            PushEvent::FolderDeleted { folder } => push.push_sync_folder_delete(&folder).await,
            PushEvent::SyncCiphers { user_id } => push.push_sync_ciphers(user_id).await,
            PushEvent::SyncVault { user_id } => push.push_sync_vault(user_id).await,
            PushEvent::SyncOrganizations { user_id } => push.push_sync_organizations(user_id).await,
            PushEvent::SyncOrgKeys { user_id } => push.push_sync_org_keys(user_id).await,
            PushEvent::SyncSettings { user_id } => push.push_sync_settings(user_id).await,
            PushEvent::RefreshSecurityTasks { user_id } => {
                push.push_refresh_security_tasks(user_id).await
            }
            PushEvent::LogOut {
                user_id,
                exclude_current_context,
                reason,
            } => {
                push.push_log_out(user_id, exclude_current_context, reason)
                    .await
            }
            PushEvent::SendCreated { send } => push.push_sync_send_create(&send).await,
            PushEvent::SendUpdated { send } => push.push_sync_send_update(&send).await,
            PushEvent::SendDeleted { send } => push.push_sync_send_delete(&send).await,
            PushEvent::AuthRequestCreated { auth_request } => {
                push.push_auth_request(&auth_request).await
            }
            PushEvent::AuthRequestResponded { auth_request } => {
                push.push_auth_request_response(&auth_request).await
            }
            PushEvent::NotificationCreated { notification } => {
                push.push_notification(&notification).await
            }
            PushEvent::NotificationStatusChanged {
                notification,
                status,
            } => push.push_notification_status(&notification, &status).await,
            PushEvent::OrganizationStatusChanged { organization } => {
                push.push_sync_organization_status(&organization).await
            }
            PushEvent::OrganizationCollectionSettingsChanged { organization } => {
                push.push_sync_organization_collection_management_settings(&organization)
                    .await
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventAccepted {
    pub accepted: bool,
    pub event: String,
}

/// POST /api/v1/events
///
/// The `X-Device-Identifier` header, when present, is the ambient device
/// identifier for every push the event produces.
pub async fn publish_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<PushEvent>,
) -> Result<(StatusCode, Json<EventAccepted>)> {
    let name = event.name();
    let identifier = device_identifier(&headers);

    tracing::debug!(event = name, has_device = identifier.is_some(), "Event received");

    RequestContext::scope(identifier, event.dispatch(&state.push)).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(EventAccepted {
            accepted: true,
            event: name.to_string(),
        }),
    ))
}
