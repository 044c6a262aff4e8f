//! Typed push operations shared by every engine.

use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::error::PushError;
use crate::metrics::PushMetrics;

use super::context::{Clock, CurrentContext};
use super::engine::PushEngine;
use super::entities::{
    AuthRequest, Cipher, Folder, Notification, NotificationStatus, Organization, Send,
};
use super::types::{
    AuthRequestPushNotification, Envelope, LogOutPushNotification, LogOutReason,
    NotificationPushNotification, OrganizationCollectionManagementPushNotification,
    OrganizationStatusPushNotification, PushMessage, PushNotification, PushPayload, PushTarget,
    PushType, SyncCipherPushNotification, SyncFolderPushNotification, SyncSendPushNotification,
    UserPushNotification,
};

/// Builds envelopes for domain events and hands them to the configured
/// engine.
///
/// Holds no per-call state; clone the `Arc` freely.
pub struct PushNotificationService {
    engine: Arc<dyn PushEngine>,
    context: Arc<dyn CurrentContext>,
    clock: Arc<dyn Clock>,
    installation_id: Uuid,
}

impl PushNotificationService {
    pub fn new(
        engine: Arc<dyn PushEngine>,
        context: Arc<dyn CurrentContext>,
        clock: Arc<dyn Clock>,
        installation_id: Uuid,
    ) -> Self {
        Self {
            engine,
            context,
            clock,
            installation_id,
        }
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn installation_id(&self) -> Uuid {
        self.installation_id
    }

    /// Map a runtime cipher push type to the typed call.
    pub async fn push_cipher(
        &self,
        cipher: &Cipher,
        push_type: PushType,
        collection_ids: Option<Vec<Uuid>>,
    ) -> Result<(), PushError> {
        match push_type {
            PushType::SyncCipherCreate | PushType::SyncCipherUpdate | PushType::SyncCipherDelete => {}
            other => return Err(PushError::UnsupportedPushType(other)),
        }

        let target = if let Some(organization_id) = cipher.organization_id {
            PushTarget::Organization(organization_id)
        } else if let Some(user_id) = cipher.user_id {
            PushTarget::User(user_id)
        } else {
            tracing::warn!(cipher_id = %cipher.id, "Cipher has no owner, skipping push");
            return Ok(());
        };

        self.push(PushNotification {
            push_type,
            target,
            payload: PushPayload::Cipher(SyncCipherPushNotification {
                id: cipher.id,
                user_id: cipher.user_id,
                organization_id: cipher.organization_id,
                collection_ids,
                revision_date: cipher.revision_date,
            }),
            exclude_current_context: true,
            client_type: None,
        })
        .await
    }

    pub async fn push_sync_cipher_create(
        &self,
        cipher: &Cipher,
        collection_ids: Vec<Uuid>,
    ) -> Result<(), PushError> {
        self.push_cipher(cipher, PushType::SyncCipherCreate, Some(collection_ids))
            .await
    }

    pub async fn push_sync_cipher_update(
        &self,
        cipher: &Cipher,
        collection_ids: Vec<Uuid>,
    ) -> Result<(), PushError> {
        self.push_cipher(cipher, PushType::SyncCipherUpdate, Some(collection_ids))
            .await
    }

    pub async fn push_sync_cipher_delete(&self, cipher: &Cipher) -> Result<(), PushError> {
        self.push_cipher(cipher, PushType::SyncCipherDelete, None).await
    }

    pub async fn push_sync_folder_create(&self, folder: &Folder) -> Result<(), PushError> {
        self.push_folder(folder, PushType::SyncFolderCreate).await
    }

    pub async fn push_sync_folder_update(&self, folder: &Folder) -> Result<(), PushError> {
        self.push_folder(folder, PushType::SyncFolderUpdate).await
    }

    pub async fn push_sync_folder_delete(&self, folder: &Folder) -> Result<(), PushError> {
        self.push_folder(folder, PushType::SyncFolderDelete).await
    }

    async fn push_folder(&self, folder: &Folder, push_type: PushType) -> Result<(), PushError> {
        self.push(PushNotification {
            push_type,
            target: PushTarget::User(folder.user_id),
            payload: PushPayload::Folder(SyncFolderPushNotification {
                id: folder.id,
                user_id: folder.user_id,
                revision_date: folder.revision_date,
            }),
            exclude_current_context: true,
            client_type: None,
        })
        .await
    }

    pub async fn push_sync_ciphers(&self, user_id: Uuid) -> Result<(), PushError> {
        self.push_user(user_id, PushType::SyncCiphers).await
    }

    pub async fn push_sync_vault(&self, user_id: Uuid) -> Result<(), PushError> {
        self.push_user(user_id, PushType::SyncVault).await
    }

    pub async fn push_sync_organizations(&self, user_id: Uuid) -> Result<(), PushError> {
        self.push_user(user_id, PushType::SyncOrganizations).await
    }

    pub async fn push_sync_org_keys(&self, user_id: Uuid) -> Result<(), PushError> {
        self.push_user(user_id, PushType::SyncOrgKeys).await
    }

    pub async fn push_sync_settings(&self, user_id: Uuid) -> Result<(), PushError> {
        self.push_user(user_id, PushType::SyncSettings).await
    }

    pub async fn push_refresh_security_tasks(&self, user_id: Uuid) -> Result<(), PushError> {
        self.push_user(user_id, PushType::RefreshSecurityTasks).await
    }

    /// Full-resync pushes go to every device of the user, the originating one
    /// included.
    async fn push_user(&self, user_id: Uuid, push_type: PushType) -> Result<(), PushError> {
        self.push(PushNotification {
            push_type,
            target: PushTarget::User(user_id),
            payload: PushPayload::User(UserPushNotification {
                user_id,
                date: self.clock.now(),
            }),
            exclude_current_context: false,
            client_type: None,
        })
        .await
    }

    pub async fn push_log_out(
        &self,
        user_id: Uuid,
        exclude_current_context: bool,
        reason: Option<LogOutReason>,
    ) -> Result<(), PushError> {
        self.push(PushNotification {
            push_type: PushType::LogOut,
            target: PushTarget::User(user_id),
            payload: PushPayload::LogOut(LogOutPushNotification {
                user_id,
                date: self.clock.now(),
                reason,
            }),
            exclude_current_context,
            client_type: None,
        })
        .await
    }

    pub async fn push_sync_send_create(&self, send: &Send) -> Result<(), PushError> {
        self.push_send(send, PushType::SyncSendCreate).await
    }

    pub async fn push_sync_send_update(&self, send: &Send) -> Result<(), PushError> {
        self.push_send(send, PushType::SyncSendUpdate).await
    }

    pub async fn push_sync_send_delete(&self, send: &Send) -> Result<(), PushError> {
        self.push_send(send, PushType::SyncSendDelete).await
    }

    async fn push_send(&self, send: &Send, push_type: PushType) -> Result<(), PushError> {
        let Some(user_id) = send.user_id else {
            tracing::debug!(send_id = %send.id, "Send is not user owned, skipping push");
            return Ok(());
        };

        self.push(PushNotification {
            push_type,
            target: PushTarget::User(user_id),
            payload: PushPayload::Send(SyncSendPushNotification {
                id: send.id,
                user_id,
                revision_date: send.revision_date,
            }),
            exclude_current_context: true,
            client_type: None,
        })
        .await
    }

    pub async fn push_auth_request(&self, auth_request: &AuthRequest) -> Result<(), PushError> {
        self.push_auth(auth_request, PushType::AuthRequest).await
    }

    pub async fn push_auth_request_response(
        &self,
        auth_request: &AuthRequest,
    ) -> Result<(), PushError> {
        self.push_auth(auth_request, PushType::AuthRequestResponse)
            .await
    }

    async fn push_auth(
        &self,
        auth_request: &AuthRequest,
        push_type: PushType,
    ) -> Result<(), PushError> {
        self.push(PushNotification {
            push_type,
            target: PushTarget::User(auth_request.user_id),
            payload: PushPayload::AuthRequest(AuthRequestPushNotification {
                id: auth_request.id,
                user_id: auth_request.user_id,
            }),
            exclude_current_context: true,
            client_type: None,
        })
        .await
    }

    pub async fn push_notification(&self, notification: &Notification) -> Result<(), PushError> {
        self.push_notification_center(notification, None, PushType::Notification)
            .await
    }

    pub async fn push_notification_status(
        &self,
        notification: &Notification,
        status: &NotificationStatus,
    ) -> Result<(), PushError> {
        self.push_notification_center(notification, Some(status), PushType::NotificationStatus)
            .await
    }

    async fn push_notification_center(
        &self,
        notification: &Notification,
        status: Option<&NotificationStatus>,
        push_type: PushType,
    ) -> Result<(), PushError> {
        let target = if notification.global {
            PushTarget::Installation(self.installation_id)
        } else if let Some(user_id) = notification.user_id {
            PushTarget::User(user_id)
        } else if let Some(organization_id) = notification.organization_id {
            PushTarget::Organization(organization_id)
        } else {
            tracing::warn!(
                notification_id = %notification.id,
                push_type = %push_type,
                "Notification has no recipient, skipping push"
            );
            return Ok(());
        };

        let payload = NotificationPushNotification {
            id: notification.id,
            priority: notification.priority,
            global: notification.global,
            client_type: notification.client_type,
            user_id: notification.user_id,
            organization_id: notification.organization_id,
            task_id: notification.task_id,
            installation_id: notification.global.then_some(self.installation_id),
            title: notification.title.clone(),
            body: notification.body.clone(),
            creation_date: notification.creation_date,
            revision_date: notification.revision_date,
            read_date: status.and_then(|s| s.read_date),
            deleted_date: status.and_then(|s| s.deleted_date),
        };

        self.push(PushNotification {
            push_type,
            target,
            payload: PushPayload::Notification(payload),
            exclude_current_context: true,
            client_type: Some(notification.client_type),
        })
        .await
    }

    pub async fn push_sync_organization_status(
        &self,
        organization: &Organization,
    ) -> Result<(), PushError> {
        self.push(PushNotification {
            push_type: PushType::SyncOrganizationStatusChanged,
            target: PushTarget::Organization(organization.id),
            payload: PushPayload::OrganizationStatus(OrganizationStatusPushNotification {
                organization_id: organization.id,
                enabled: organization.enabled,
            }),
            exclude_current_context: false,
            client_type: None,
        })
        .await
    }

    pub async fn push_sync_organization_collection_management_settings(
        &self,
        organization: &Organization,
    ) -> Result<(), PushError> {
        self.push(PushNotification {
            push_type: PushType::SyncOrganizationCollectionSettingsChanged,
            target: PushTarget::Organization(organization.id),
            payload: PushPayload::OrganizationCollectionManagement(
                OrganizationCollectionManagementPushNotification {
                    organization_id: organization.id,
                    limit_collection_creation: organization.limit_collection_creation,
                    limit_collection_deletion: organization.limit_collection_deletion,
                    limit_item_deletion: organization.limit_item_deletion,
                },
            ),
            exclude_current_context: false,
            client_type: None,
        })
        .await
    }

    /// Apply the ambient context and deliver through the engine.
    #[tracing::instrument(
        name = "push.send",
        skip(self, notification),
        fields(
            engine = self.engine.name(),
            push_type = %notification.push_type,
            target = notification.target.kind()
        )
    )]
    pub async fn push(&self, notification: PushNotification) -> Result<(), PushError> {
        let context_id = if notification.exclude_current_context {
            self.context.device_identifier()
        } else {
            None
        };

        let message = PushMessage {
            envelope: Envelope {
                push_type: notification.push_type,
                payload: notification.payload,
                context_id,
            },
            client_type: notification.client_type,
        };

        let engine = self.engine.name();
        let push_type = notification.push_type;
        let started = Instant::now();

        match self.engine.send(notification.target, message).await {
            Ok(()) => {
                PushMetrics::record_sent(engine, push_type, started.elapsed());
                Ok(())
            }
            Err(e) => {
                PushMetrics::record_failed(engine, started.elapsed());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};

    use crate::push::context::{FixedClock, StaticContext};
    use crate::push::types::{ClientType, Priority};

    #[derive(Default)]
    struct RecordingEngine {
        sent: Mutex<Vec<(PushTarget, PushMessage)>>,
        fail: bool,
    }

    impl RecordingEngine {
        fn take(&self) -> Vec<(PushTarget, PushMessage)> {
            std::mem::take(&mut *self.sent.lock().unwrap())
        }

        fn record(&self, target: PushTarget, message: PushMessage) -> Result<(), PushError> {
            if self.fail {
                return Err(PushError::transport_status(500, "boom"));
            }
            self.sent.lock().unwrap().push((target, message));
            Ok(())
        }
    }

    #[async_trait]
    impl PushEngine for RecordingEngine {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn send_to_user(&self, user_id: Uuid, message: PushMessage) -> Result<(), PushError> {
            self.record(PushTarget::User(user_id), message)
        }

        async fn send_to_organization(
            &self,
            organization_id: Uuid,
            message: PushMessage,
        ) -> Result<(), PushError> {
            self.record(PushTarget::Organization(organization_id), message)
        }

        async fn send_to_installation(
            &self,
            installation_id: Uuid,
            message: PushMessage,
        ) -> Result<(), PushError> {
            self.record(PushTarget::Installation(installation_id), message)
        }
    }

    struct Fixture {
        engine: Arc<RecordingEngine>,
        clock: Arc<FixedClock>,
        installation_id: Uuid,
        service: PushNotificationService,
    }

    fn fixture_with(engine: RecordingEngine, device: &str) -> Fixture {
        let engine = Arc::new(engine);
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let installation_id = Uuid::new_v4();
        let service = PushNotificationService::new(
            engine.clone(),
            Arc::new(StaticContext::new(device)),
            clock.clone(),
            installation_id,
        );
        Fixture {
            engine,
            clock,
            installation_id,
            service,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingEngine::default(), "dev-1")
    }

    fn envelope_json(message: &PushMessage) -> Value {
        serde_json::to_value(&message.envelope).unwrap()
    }

    fn notification(global: bool, user_id: Option<Uuid>, organization_id: Option<Uuid>) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            priority: Priority::High,
            global,
            client_type: ClientType::All,
            user_id,
            organization_id,
            task_id: None,
            title: Some("My Title".to_string()),
            body: Some("My Body".to_string()),
            creation_date: Utc::now() - Duration::days(1),
            revision_date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_personal_cipher_create_goes_to_user() {
        let f = fixture();
        let cipher = Cipher {
            id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            organization_id: None,
            revision_date: Utc::now(),
        };
        let collection_id = Uuid::new_v4();

        f.service
            .push_sync_cipher_create(&cipher, vec![collection_id])
            .await
            .unwrap();

        let sent = f.engine.take();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, PushTarget::User(cipher.user_id.unwrap()));
        assert_eq!(
            envelope_json(&sent[0].1),
            json!({
                "Type": 1,
                "Payload": {
                    "Id": cipher.id,
                    "UserId": cipher.user_id,
                    "CollectionIds": [collection_id],
                    "RevisionDate": cipher.revision_date,
                },
                "ContextId": "dev-1",
            })
        );
    }

    #[tokio::test]
    async fn test_organization_cipher_goes_to_organization() {
        let f = fixture();
        let organization_id = Uuid::new_v4();
        let cipher = Cipher {
            id: Uuid::new_v4(),
            user_id: None,
            organization_id: Some(organization_id),
            revision_date: Utc::now(),
        };

        f.service
            .push_sync_cipher_update(&cipher, vec![Uuid::new_v4()])
            .await
            .unwrap();

        let sent = f.engine.take();
        assert_eq!(sent[0].0, PushTarget::Organization(organization_id));
        assert_eq!(sent[0].1.push_type(), PushType::SyncCipherUpdate);
    }

    #[tokio::test]
    async fn test_push_cipher_rejects_non_cipher_types() {
        let f = fixture();
        let cipher = Cipher {
            id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            organization_id: None,
            revision_date: Utc::now(),
        };

        let err = f
            .service
            .push_cipher(&cipher, PushType::SyncVault, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PushError::UnsupportedPushType(PushType::SyncVault)));
        assert!(f.engine.take().is_empty());
    }

    #[tokio::test]
    async fn test_full_resync_never_carries_context() {
        let f = fixture();
        let user_id = Uuid::new_v4();

        f.service.push_sync_ciphers(user_id).await.unwrap();
        f.service.push_sync_vault(user_id).await.unwrap();
        f.service.push_sync_organizations(user_id).await.unwrap();
        f.service.push_sync_org_keys(user_id).await.unwrap();
        f.service.push_sync_settings(user_id).await.unwrap();
        f.service.push_refresh_security_tasks(user_id).await.unwrap();

        let types: Vec<u8> = f
            .engine
            .take()
            .into_iter()
            .map(|(target, message)| {
                assert_eq!(target, PushTarget::User(user_id));
                assert_eq!(message.envelope.context_id, None);
                message.push_type() as u8
            })
            .collect();
        assert_eq!(types, vec![4, 5, 17, 6, 10, 22]);
    }

    #[tokio::test]
    async fn test_payload_date_comes_from_clock() {
        let f = fixture();
        let user_id = Uuid::new_v4();
        f.clock.advance(Duration::hours(3));
        let expected = f.clock.now();

        f.service.push_sync_vault(user_id).await.unwrap();

        let sent = f.engine.take();
        assert_eq!(
            envelope_json(&sent[0].1)["Payload"]["Date"],
            serde_json::to_value(expected).unwrap()
        );
    }

    #[tokio::test]
    async fn test_log_out_context_follows_flag() {
        let f = fixture();
        let user_id = Uuid::new_v4();

        f.service.push_log_out(user_id, false, None).await.unwrap();
        f.service
            .push_log_out(user_id, true, Some(LogOutReason::KdfChange))
            .await
            .unwrap();

        let sent = f.engine.take();
        assert_eq!(
            envelope_json(&sent[0].1),
            json!({
                "Type": 11,
                "Payload": { "UserId": user_id, "Date": f.clock.now() },
            })
        );
        assert_eq!(sent[1].1.envelope.context_id.as_deref(), Some("dev-1"));
        assert_eq!(envelope_json(&sent[1].1)["Payload"]["Reason"], json!(0));
    }

    #[tokio::test]
    async fn test_organization_send_is_skipped() {
        let f = fixture();
        let send = Send {
            id: Uuid::new_v4(),
            user_id: None,
            organization_id: Some(Uuid::new_v4()),
            revision_date: Utc::now(),
        };

        f.service.push_sync_send_create(&send).await.unwrap();
        assert!(f.engine.take().is_empty());
    }

    #[tokio::test]
    async fn test_global_notification_targets_installation() {
        let f = fixture();
        let n = notification(true, None, None);

        f.service.push_notification(&n).await.unwrap();

        let sent = f.engine.take();
        assert_eq!(sent[0].0, PushTarget::Installation(f.installation_id));
        assert_eq!(sent[0].1.client_type, Some(ClientType::All));
        let value = envelope_json(&sent[0].1);
        assert_eq!(value["Payload"]["InstallationId"], json!(f.installation_id));
        assert_eq!(value["ContextId"], json!("dev-1"));
    }

    #[tokio::test]
    async fn test_user_notification_has_no_installation() {
        let f = fixture();
        let user_id = Uuid::new_v4();
        let n = notification(false, Some(user_id), None);

        f.service
            .push_notification_status(
                &n,
                &NotificationStatus {
                    read_date: Some(Utc::now()),
                    deleted_date: None,
                },
            )
            .await
            .unwrap();

        let sent = f.engine.take();
        assert_eq!(sent[0].0, PushTarget::User(user_id));
        let payload = envelope_json(&sent[0].1)["Payload"].clone();
        let payload = payload.as_object().unwrap();
        assert!(!payload.contains_key("InstallationId"));
        assert!(!payload.contains_key("OrganizationId"));
        assert!(!payload.contains_key("DeletedDate"));
        assert!(payload.contains_key("ReadDate"));
    }

    #[tokio::test]
    async fn test_unaddressed_notification_is_skipped() {
        let f = fixture();
        f.service
            .push_notification(&notification(false, None, None))
            .await
            .unwrap();
        assert!(f.engine.take().is_empty());
    }

    #[tokio::test]
    async fn test_organization_settings_payload() {
        let f = fixture();
        let organization = Organization {
            id: Uuid::new_v4(),
            enabled: true,
            limit_collection_creation: true,
            limit_collection_deletion: true,
            limit_item_deletion: true,
        };

        f.service
            .push_sync_organization_collection_management_settings(&organization)
            .await
            .unwrap();

        let sent = f.engine.take();
        assert_eq!(sent[0].0, PushTarget::Organization(organization.id));
        assert_eq!(
            envelope_json(&sent[0].1),
            json!({
                "Type": 19,
                "Payload": {
                    "OrganizationId": organization.id,
                    "LimitCollectionCreation": true,
                    "LimitCollectionDeletion": true,
                    "LimitItemDeletion": true,
                },
            })
        );
    }

    #[tokio::test]
    async fn test_missing_device_identifier_leaves_context_absent() {
        let f = fixture_with(RecordingEngine::default(), "");
        let folder = Folder {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            revision_date: Utc::now(),
        };

        f.service.push_sync_folder_create(&folder).await.unwrap();

        let sent = f.engine.take();
        assert_eq!(sent[0].1.envelope.context_id, None);
    }

    #[tokio::test]
    async fn test_every_operation_type_target_and_context() {
        let f = fixture();
        let user_id = Uuid::new_v4();
        let organization_id = Uuid::new_v4();
        let now = Utc::now();

        let cipher = Cipher {
            id: Uuid::new_v4(),
            user_id: Some(user_id),
            organization_id: None,
            revision_date: now,
        };
        let folder = Folder {
            id: Uuid::new_v4(),
            user_id,
            revision_date: now,
        };
        let send = Send {
            id: Uuid::new_v4(),
            user_id: Some(user_id),
            organization_id: None,
            revision_date: now,
        };
        let auth_request = AuthRequest {
            id: Uuid::new_v4(),
            user_id,
        };
        let organization = Organization {
            id: organization_id,
            enabled: false,
            limit_collection_creation: false,
            limit_collection_deletion: false,
            limit_item_deletion: false,
        };
        let user_notification = notification(false, Some(user_id), None);
        let status = NotificationStatus::default();

        let s = &f.service;
        s.push_cipher(&cipher, PushType::SyncCipherUpdate, None).await.unwrap();
        s.push_sync_cipher_create(&cipher, vec![]).await.unwrap();
        s.push_sync_cipher_update(&cipher, vec![]).await.unwrap();
        s.push_sync_cipher_delete(&cipher).await.unwrap();
        s.push_sync_folder_create(&folder).await.unwrap();
        s.push_sync_folder_update(&folder).await.unwrap();
        s.push_sync_folder_delete(&folder).await.unwrap();
        s.push_sync_ciphers(user_id).await.unwrap();
        s.push_sync_vault(user_id).await.unwrap();
        s.push_sync_organizations(user_id).await.unwrap();
        s.push_sync_org_keys(user_id).await.unwrap();
        s.push_sync_settings(user_id).await.unwrap();
        s.push_refresh_security_tasks(user_id).await.unwrap();
        s.push_log_out(user_id, true, None).await.unwrap();
        s.push_sync_send_create(&send).await.unwrap();
        s.push_sync_send_update(&send).await.unwrap();
        s.push_sync_send_delete(&send).await.unwrap();
        s.push_auth_request(&auth_request).await.unwrap();
        s.push_auth_request_response(&auth_request).await.unwrap();
        s.push_notification(&user_notification).await.unwrap();
        s.push_notification_status(&user_notification, &status).await.unwrap();
        s.push_sync_organization_status(&organization).await.unwrap();
        s.push_sync_organization_collection_management_settings(&organization)
            .await
            .unwrap();

        let user = PushTarget::User(user_id);
        let org = PushTarget::Organization(organization_id);
        let expected = [
            (0, user, true),
            (1, user, true),
            (0, user, true),
            (2, user, true),
            (7, user, true),
            (8, user, true),
            (3, user, true),
            (4, user, false),
            (5, user, false),
            (17, user, false),
            (6, user, false),
            (10, user, false),
            (22, user, false),
            (11, user, true),
            (12, user, true),
            (13, user, true),
            (14, user, true),
            (15, user, true),
            (16, user, true),
            (20, user, true),
            (21, user, true),
            (18, org, false),
            (19, org, false),
        ];

        let sent = f.engine.take();
        assert_eq!(sent.len(), expected.len());
        for ((target, message), (push_type, expected_target, has_context)) in
            sent.iter().zip(expected)
        {
            let value = envelope_json(message);
            assert_eq!(value["Type"], json!(push_type));
            assert_eq!(*target, expected_target, "target of type {}", push_type);
            assert_eq!(
                value.get("ContextId").is_some(),
                has_context,
                "context of type {}",
                push_type
            );
        }
    }

    #[tokio::test]
    async fn test_cipher_delete_has_no_collections() {
        let f = fixture();
        let cipher = Cipher {
            id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            organization_id: None,
            revision_date: Utc::now(),
        };

        f.service.push_sync_cipher_delete(&cipher).await.unwrap();

        let sent = f.engine.take();
        let payload = envelope_json(&sent[0].1)["Payload"].clone();
        assert!(payload.get("CollectionIds").is_none());
        assert!(payload.get("OrganizationId").is_none());
        assert_eq!(payload["Id"], json!(cipher.id));
    }

    #[tokio::test]
    async fn test_user_send_payload() {
        let f = fixture();
        let user_id = Uuid::new_v4();
        let send = Send {
            id: Uuid::new_v4(),
            user_id: Some(user_id),
            organization_id: None,
            revision_date: Utc::now(),
        };

        f.service.push_sync_send_update(&send).await.unwrap();

        let sent = f.engine.take();
        assert_eq!(sent[0].0, PushTarget::User(user_id));
        assert_eq!(
            envelope_json(&sent[0].1),
            json!({
                "Type": 13,
                "Payload": {
                    "Id": send.id,
                    "UserId": user_id,
                    "RevisionDate": send.revision_date,
                },
                "ContextId": "dev-1",
            })
        );
    }

    #[tokio::test]
    async fn test_auth_request_payload() {
        let f = fixture();
        let auth_request = AuthRequest {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
        };

        f.service.push_auth_request_response(&auth_request).await.unwrap();

        let sent = f.engine.take();
        assert_eq!(
            envelope_json(&sent[0].1),
            json!({
                "Type": 16,
                "Payload": { "Id": auth_request.id, "UserId": auth_request.user_id },
                "ContextId": "dev-1",
            })
        );
    }

    #[tokio::test]
    async fn test_organization_status_payload() {
        let f = fixture();
        let organization = Organization {
            id: Uuid::new_v4(),
            enabled: true,
            limit_collection_creation: false,
            limit_collection_deletion: false,
            limit_item_deletion: false,
        };

        f.service
            .push_sync_organization_status(&organization)
            .await
            .unwrap();

        let sent = f.engine.take();
        assert_eq!(sent[0].0, PushTarget::Organization(organization.id));
        assert_eq!(
            envelope_json(&sent[0].1),
            json!({
                "Type": 18,
                "Payload": { "OrganizationId": organization.id, "Enabled": true },
            })
        );
    }

    #[tokio::test]
    async fn test_engine_errors_propagate() {
        let f = fixture_with(
            RecordingEngine {
                fail: true,
                ..Default::default()
            },
            "dev-1",
        );

        let err = f.service.push_sync_vault(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, PushError::Transport { status: Some(500), .. }));
    }
}
