//! Push notification delivery.
//!
//! Domain events become typed [`Envelope`]s in [`PushNotificationService`],
//! which hands each one to a single [`PushEngine`] primitive. Three engines
//! do the network work:
//!
//! - [`AzureQueuePushEngine`]: JSON envelope onto a storage queue
//! - [`RelayPushEngine`]: address-enriched request to the push relay
//! - [`NotificationsApiPushEngine`]: bare envelope to the notifications service
//!
//! The HTTP engines authenticate through a [`TokenProvider`] each.

pub mod auth;
pub mod azure_queue;
pub mod context;
pub mod engine;
pub mod entities;
pub mod factory;
pub mod http;
pub mod notifications_api;
pub mod relay;
pub mod service;
pub mod types;

pub use auth::{ClientCredentials, TokenProvider, TokenState};
pub use azure_queue::AzureQueuePushEngine;
pub use context::{Clock, CurrentContext, FixedClock, RequestContext, StaticContext, SystemClock};
pub use engine::{NoopPushEngine, PushEngine};
pub use entities::{
    AuthRequest, Cipher, Folder, Notification, NotificationStatus, Organization, Send,
};
pub use factory::{create_push_engine, create_push_service, EngineDependencies};
pub use http::HttpClientFactory;
pub use notifications_api::NotificationsApiPushEngine;
pub use relay::{RelayPushEngine, RelayPushRequest};
pub use service::PushNotificationService;
pub use types::{
    ClientType, Envelope, LogOutReason, Priority, PushMessage, PushNotification, PushPayload,
    PushTarget, PushType,
};
