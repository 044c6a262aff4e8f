//! Domain records the push operations read from.
//!
//! These are owned by the vault, tools, auth and admin domains; only the
//! fields a push needs are modelled here.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::types::{ClientType, Priority};

#[derive(Debug, Clone, Deserialize)]
pub struct Cipher {
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    pub revision_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Folder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub revision_date: DateTime<Utc>,
}

/// A Send belongs to a user or to an organization; only user-owned sends are
/// pushed.
#[derive(Debug, Clone, Deserialize)]
pub struct Send {
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    pub revision_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthRequest {
    pub id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub limit_collection_creation: bool,
    #[serde(default)]
    pub limit_collection_deletion: bool,
    #[serde(default)]
    pub limit_item_deletion: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub global: bool,
    #[serde(default)]
    pub client_type: ClientType,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    #[serde(default)]
    pub task_id: Option<Uuid>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    pub creation_date: DateTime<Utc>,
    pub revision_date: DateTime<Utc>,
}

/// Per-user read/delete state of a notification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationStatus {
    #[serde(default)]
    pub read_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_date: Option<DateTime<Utc>>,
}
