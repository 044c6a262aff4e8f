//! Push engine factory

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;

use crate::config::Settings;
use crate::device::DeviceRepository;
use crate::error::PushError;
use crate::queue::create_queue_client;

use super::auth::{ClientCredentials, TokenProvider};
use super::azure_queue::AzureQueuePushEngine;
use super::context::{Clock, CurrentContext};
use super::engine::{NoopPushEngine, PushEngine};
use super::http::{HttpClientFactory, IDENTITY_CLIENT, PUSH_CLIENT};
use super::notifications_api::NotificationsApiPushEngine;
use super::relay::RelayPushEngine;
use super::service::PushNotificationService;

/// Collaborators shared by every engine.
#[derive(Clone)]
pub struct EngineDependencies {
    pub http: Arc<HttpClientFactory>,
    pub devices: Arc<dyn DeviceRepository>,
    pub context: Arc<dyn CurrentContext>,
    pub clock: Arc<dyn Clock>,
}

impl EngineDependencies {
    pub fn new(
        settings: &Settings,
        devices: Arc<dyn DeviceRepository>,
        context: Arc<dyn CurrentContext>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http: Arc::new(HttpClientFactory::new(Duration::from_secs(
                settings.push.http_timeout_seconds,
            ))),
            devices,
            context,
            clock,
        }
    }
}

/// Create the engine named by `settings.push.engine`:
/// - `"azure_queue"`: serialized envelopes onto the configured queue
/// - `"relay"`: the hosted push relay, authenticated as this installation
/// - `"notifications_api"`: the internal notifications service
/// - `"noop"`: delivery disabled
///
/// Missing URIs or credentials for the selected engine are reported here,
/// not on the first push.
pub fn create_push_engine(
    settings: &Settings,
    deps: &EngineDependencies,
) -> Result<Arc<dyn PushEngine>, PushError> {
    match settings.push.engine.as_str() {
        "azure_queue" => {
            let queue = create_queue_client(&settings.queue, deps.http.client(PUSH_CLIENT)?)?;
            tracing::info!(
                engine = "azure_queue",
                backend = queue.backend(),
                "Creating queue push engine"
            );
            Ok(Arc::new(AzureQueuePushEngine::new(queue)))
        }
        "relay" => {
            let base_uri = required(settings.push_relay_base_uri.as_deref(), "push_relay_base_uri")?;
            let identity_uri = required(
                settings.installation.identity_uri.as_deref(),
                "installation.identity_uri",
            )?;
            let key = required(settings.installation.key.as_deref(), "installation.key")?;
            if settings.installation.id.is_nil() {
                return Err(PushError::Config(
                    "installation.id is required for the relay engine".to_string(),
                ));
            }

            let token = token_provider(
                settings,
                deps,
                "relay",
                identity_uri,
                ClientCredentials {
                    client_id: format!("installation.{}", settings.installation.id),
                    client_secret: key.to_string(),
                    scope: "api.push".to_string(),
                },
            )?;

            tracing::info!(engine = "relay", base_uri = %base_uri, "Creating relay push engine");
            Ok(Arc::new(RelayPushEngine::new(
                deps.http.client(PUSH_CLIENT)?,
                token,
                deps.devices.clone(),
                deps.context.clone(),
                base_uri,
            )))
        }
        "notifications_api" => {
            let base_uri = required(
                settings.base_uri.internal_notifications.as_deref(),
                "base_uri.internal_notifications",
            )?;
            let identity_uri = required(
                settings.base_uri.internal_identity.as_deref(),
                "base_uri.internal_identity",
            )?;
            let key = required(settings.internal_identity_key.as_deref(), "internal_identity_key")?;

            let token = token_provider(
                settings,
                deps,
                "notifications_api",
                identity_uri,
                ClientCredentials {
                    client_id: settings.internal_client_id.clone(),
                    client_secret: key.to_string(),
                    scope: "internal".to_string(),
                },
            )?;

            tracing::info!(
                engine = "notifications_api",
                base_uri = %base_uri,
                "Creating notifications API push engine"
            );
            Ok(Arc::new(NotificationsApiPushEngine::new(
                deps.http.client(PUSH_CLIENT)?,
                token,
                base_uri,
            )))
        }
        "noop" => {
            tracing::info!(engine = "noop", "Push delivery disabled");
            Ok(Arc::new(NoopPushEngine))
        }
        other => Err(PushError::Config(format!("unknown push engine: {}", other))),
    }
}

/// Engine plus the typed operations on top of it.
pub fn create_push_service(
    settings: &Settings,
    deps: &EngineDependencies,
) -> Result<PushNotificationService, PushError> {
    let engine = create_push_engine(settings, deps)?;
    Ok(PushNotificationService::new(
        engine,
        deps.context.clone(),
        deps.clock.clone(),
        settings.installation.id,
    ))
}

fn token_provider(
    settings: &Settings,
    deps: &EngineDependencies,
    name: &str,
    identity_uri: &str,
    credentials: ClientCredentials,
) -> Result<Arc<TokenProvider>, PushError> {
    let provider = TokenProvider::new(
        name,
        deps.http.client(IDENTITY_CLIENT)?,
        identity_uri,
        credentials,
        deps.clock.clone(),
    )
    .with_refresh_margin(ChronoDuration::seconds(
        settings.push.token_refresh_margin_seconds,
    ));

    Ok(Arc::new(provider))
}

fn required<'a>(value: Option<&'a str>, key: &str) -> Result<&'a str, PushError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(PushError::Config(format!("{} is not configured", key))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use uuid::Uuid;

    use crate::device::MemoryDeviceRepository;
    use crate::push::context::{StaticContext, SystemClock};

    fn deps(settings: &Settings) -> EngineDependencies {
        EngineDependencies::new(
            settings,
            Arc::new(MemoryDeviceRepository::new()),
            Arc::new(StaticContext::empty()),
            Arc::new(SystemClock),
        )
    }

    fn relay_settings() -> Settings {
        let mut settings = Settings::default();
        settings.push.engine = "relay".to_string();
        settings.push_relay_base_uri = Some("https://push.example.com".to_string());
        settings.installation.id = Uuid::new_v4();
        settings.installation.key = Some("installation-key".to_string());
        settings.installation.identity_uri = Some("https://identity.example.com".to_string());
        settings
    }

    #[test]
    fn test_default_is_noop() {
        let settings = Settings::default();
        let engine = create_push_engine(&settings, &deps(&settings)).unwrap();
        assert_eq!(engine.name(), "noop");
    }

    #[test]
    fn test_relay_engine() {
        let settings = relay_settings();
        let engine = create_push_engine(&settings, &deps(&settings)).unwrap();
        assert_eq!(engine.name(), "relay");
    }

    #[test]
    fn test_relay_requires_installation() {
        let mut settings = relay_settings();
        settings.installation.id = Uuid::nil();
        let err = create_push_engine(&settings, &deps(&settings)).err().unwrap();
        assert!(err.to_string().contains("installation.id"));

        let mut settings = relay_settings();
        settings.installation.key = None;
        let err = create_push_engine(&settings, &deps(&settings)).err().unwrap();
        assert!(err.to_string().contains("installation.key"));
    }

    #[test]
    fn test_notifications_api_requires_uris() {
        let mut settings = Settings::default();
        settings.push.engine = "notifications_api".to_string();
        settings.internal_identity_key = Some("secret".to_string());
        settings.base_uri.internal_identity = Some("https://identity.internal".to_string());

        let err = create_push_engine(&settings, &deps(&settings)).err().unwrap();
        assert!(matches!(err, PushError::Config(_)));

        settings.base_uri.internal_notifications =
            Some("https://notifications.internal".to_string());
        let engine = create_push_engine(&settings, &deps(&settings)).unwrap();
        assert_eq!(engine.name(), "notifications_api");
    }

    #[test]
    fn test_azure_queue_engine_with_memory_backend() {
        let mut settings = Settings::default();
        settings.push.engine = "azure_queue".to_string();
        let engine = create_push_engine(&settings, &deps(&settings)).unwrap();
        assert_eq!(engine.name(), "azure_queue");
    }

    #[test]
    fn test_unknown_engine() {
        let mut settings = Settings::default();
        settings.push.engine = "carrier_pigeon".to_string();
        let err = create_push_engine(&settings, &deps(&settings)).err().unwrap();
        assert!(matches!(err, PushError::Config(_)));
    }

    #[test]
    fn test_blank_value_is_missing() {
        assert!(required(Some("  "), "x").is_err());
        assert!(required(None, "x").is_err());
        assert_eq!(required(Some("v"), "x").unwrap(), "v");
    }
}
