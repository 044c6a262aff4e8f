//! Wire data model shared by every push transport.
//!
//! Field names are PascalCase on the wire. Optional payload fields are left
//! out of the JSON object when unset; receivers must tolerate their absence.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Implements integer (de)serialization for a fieldless `#[repr(u8)]` enum.
macro_rules! int_enum_serde {
    ($ty:ident { $($variant:ident = $value:literal),+ $(,)? }) => {
        impl TryFrom<u8> for $ty {
            type Error = u8;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok($ty::$variant),)+
                    other => Err(other),
                }
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_u8(*self as u8)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = u8::deserialize(deserializer)?;
                $ty::try_from(value).map_err(|v| {
                    serde::de::Error::custom(format!(
                        "invalid {} value: {}",
                        stringify!($ty),
                        v
                    ))
                })
            }
        }
    };
}

/// Kind of push. The integer values are a wire contract and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PushType {
    SyncCipherUpdate = 0,
    SyncCipherCreate = 1,
    SyncCipherDelete = 2,
    SyncFolderDelete = 3,
    SyncCiphers = 4,
    SyncVault = 5,
    SyncOrgKeys = 6,
    SyncFolderCreate = 7,
    SyncFolderUpdate = 8,
    // 9 is reserved
    SyncSettings = 10,
    LogOut = 11,
    SyncSendCreate = 12,
    SyncSendUpdate = 13,
    SyncSendDelete = 14,
    AuthRequest = 15,
    AuthRequestResponse = 16,
    SyncOrganizations = 17,
    SyncOrganizationStatusChanged = 18,
    SyncOrganizationCollectionSettingsChanged = 19,
    Notification = 20,
    NotificationStatus = 21,
    RefreshSecurityTasks = 22,
}

int_enum_serde!(PushType {
    SyncCipherUpdate = 0,
    SyncCipherCreate = 1,
    SyncCipherDelete = 2,
    SyncFolderDelete = 3,
    SyncCiphers = 4,
    SyncVault = 5,
    SyncOrgKeys = 6,
    SyncFolderCreate = 7,
    SyncFolderUpdate = 8,
    SyncSettings = 10,
    LogOut = 11,
    SyncSendCreate = 12,
    SyncSendUpdate = 13,
    SyncSendDelete = 14,
    AuthRequest = 15,
    AuthRequestResponse = 16,
    SyncOrganizations = 17,
    SyncOrganizationStatusChanged = 18,
    SyncOrganizationCollectionSettingsChanged = 19,
    Notification = 20,
    NotificationStatus = 21,
    RefreshSecurityTasks = 22,
});

impl PushType {
    /// Stable snake_case name, used as a metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            PushType::SyncCipherUpdate => "sync_cipher_update",
            PushType::SyncCipherCreate => "sync_cipher_create",
            PushType::SyncCipherDelete => "sync_cipher_delete",
            PushType::SyncFolderDelete => "sync_folder_delete",
            PushType::SyncCiphers => "sync_ciphers",
            PushType::SyncVault => "sync_vault",
            PushType::SyncOrgKeys => "sync_org_keys",
            PushType::SyncFolderCreate => "sync_folder_create",
            PushType::SyncFolderUpdate => "sync_folder_update",
            PushType::SyncSettings => "sync_settings",
            PushType::LogOut => "log_out",
            PushType::SyncSendCreate => "sync_send_create",
            PushType::SyncSendUpdate => "sync_send_update",
            PushType::SyncSendDelete => "sync_send_delete",
            PushType::AuthRequest => "auth_request",
            PushType::AuthRequestResponse => "auth_request_response",
            PushType::SyncOrganizations => "sync_organizations",
            PushType::SyncOrganizationStatusChanged => "sync_organization_status_changed",
            PushType::SyncOrganizationCollectionSettingsChanged => {
                "sync_organization_collection_settings_changed"
            }
            PushType::Notification => "notification",
            PushType::NotificationStatus => "notification_status",
            PushType::RefreshSecurityTasks => "refresh_security_tasks",
        }
    }
}

impl fmt::Display for PushType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client family a notification is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ClientType {
    #[default]
    All = 0,
    Web = 1,
    Browser = 2,
    Desktop = 3,
    Mobile = 4,
    Cli = 5,
}

int_enum_serde!(ClientType {
    All = 0,
    Web = 1,
    Browser = 2,
    Desktop = 3,
    Mobile = 4,
    Cli = 5,
});

/// Notification center priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Priority {
    #[default]
    Informational = 0,
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

int_enum_serde!(Priority {
    Informational = 0,
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LogOutReason {
    KdfChange = 0,
}

int_enum_serde!(LogOutReason { KdfChange = 0 });

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SyncCipherPushNotification {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_ids: Option<Vec<Uuid>>,
    pub revision_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SyncFolderPushNotification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub revision_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SyncSendPushNotification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub revision_date: DateTime<Utc>,
}

/// Full-resync signal for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserPushNotification {
    pub user_id: Uuid,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogOutPushNotification {
    pub user_id: Uuid,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<LogOutReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthRequestPushNotification {
    pub id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrganizationStatusPushNotification {
    pub organization_id: Uuid,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrganizationCollectionManagementPushNotification {
    pub organization_id: Uuid,
    pub limit_collection_creation: bool,
    pub limit_collection_deletion: bool,
    pub limit_item_deletion: bool,
}

/// Notification center item. `ReadDate`/`DeletedDate` are only set for the
/// status variant; `InstallationId` only for global notifications.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NotificationPushNotification {
    pub id: Uuid,
    pub priority: Priority,
    pub global: bool,
    pub client_type: ClientType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installation_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub creation_date: DateTime<Utc>,
    pub revision_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_date: Option<DateTime<Utc>>,
}

/// Every payload shape a push can carry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PushPayload {
    Cipher(SyncCipherPushNotification),
    Folder(SyncFolderPushNotification),
    Send(SyncSendPushNotification),
    User(UserPushNotification),
    LogOut(LogOutPushNotification),
    AuthRequest(AuthRequestPushNotification),
    OrganizationStatus(OrganizationStatusPushNotification),
    OrganizationCollectionManagement(OrganizationCollectionManagementPushNotification),
    Notification(NotificationPushNotification),
}

/// The `{Type, Payload, ContextId}` object every transport delivers.
///
/// `ContextId` is either the identifier of the device that triggered the
/// push or absent; it is never another device's identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Envelope {
    #[serde(rename = "Type")]
    pub push_type: PushType,
    pub payload: PushPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
}

/// Who a push is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushTarget {
    User(Uuid),
    Organization(Uuid),
    /// Every device registered under one installation
    Installation(Uuid),
}

impl PushTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            PushTarget::User(_) => "user",
            PushTarget::Organization(_) => "organization",
            PushTarget::Installation(_) => "installation",
        }
    }
}

/// An envelope plus the delivery hints an engine may use.
#[derive(Debug, Clone, PartialEq)]
pub struct PushMessage {
    pub envelope: Envelope,
    /// Only set for notification center pushes
    pub client_type: Option<ClientType>,
}

impl PushMessage {
    pub fn push_type(&self) -> PushType {
        self.envelope.push_type
    }
}

/// A push as described by a typed operation, before the ambient context is
/// applied.
#[derive(Debug, Clone)]
pub struct PushNotification {
    pub push_type: PushType,
    pub target: PushTarget,
    pub payload: PushPayload,
    pub exclude_current_context: bool,
    pub client_type: Option<ClientType>,
}
