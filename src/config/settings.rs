use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub installation: InstallationConfig,
    #[serde(default)]
    pub base_uri: BaseUriConfig,
    /// Base URI of the hosted push relay
    #[serde(default)]
    pub push_relay_base_uri: Option<String>,
    /// Secret for the internal notifications client
    #[serde(default)]
    pub internal_identity_key: Option<String>,
    #[serde(default = "default_internal_client_id")]
    pub internal_client_id: String,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    /// When set, `/api/v1` requires a matching `X-API-Key` header
    pub key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// `azure_queue`, `relay`, `notifications_api` or `noop`
    #[serde(default = "default_push_engine")]
    pub engine: String,
    /// Remaining token lifetime below which a token is refreshed
    #[serde(default = "default_token_refresh_margin")]
    pub token_refresh_margin_seconds: i64,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
}

/// Identity of this self-hosted installation at the relay.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstallationConfig {
    #[serde(default)]
    pub id: Uuid,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub identity_uri: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BaseUriConfig {
    #[serde(default)]
    pub internal_notifications: Option<String>,
    #[serde(default)]
    pub internal_identity: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// `azure`, `redis` or `memory`
    #[serde(default = "default_queue_backend")]
    pub backend: String,
    /// Queue URL including the SAS query string
    #[serde(default)]
    pub azure_queue_url: Option<String>,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    #[serde(default = "default_redis_key")]
    pub redis_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Device table location; without it device lookups use memory
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_push_engine() -> String {
    "noop".to_string()
}

fn default_token_refresh_margin() -> i64 {
    300 // 5 minutes
}

fn default_http_timeout() -> u64 {
    30
}

fn default_internal_client_id() -> String {
    "internal.notifications".to_string()
}

fn default_queue_backend() -> String {
    "memory".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_key() -> String {
    "vault:push:notifications".to_string()
}

fn default_pool_size() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "vault-push-service".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8081)?
            .set_default("push.engine", "noop")?
            .set_default("queue.backend", "memory")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // PUSH__ENGINE, INSTALLATION__ID, BASE_URI__INTERNAL_NOTIFICATIONS, ...
            .add_source(
                Environment::default()
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            api: ApiConfig::default(),
            push: PushConfig::default(),
            installation: InstallationConfig::default(),
            base_uri: BaseUriConfig::default(),
            push_relay_base_uri: None,
            internal_identity_key: None,
            internal_client_id: default_internal_client_id(),
            queue: QueueConfig::default(),
            database: DatabaseConfig::default(),
            otel: OtelConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            engine: default_push_engine(),
            token_refresh_margin_seconds: default_token_refresh_margin(),
            http_timeout_seconds: default_http_timeout(),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            backend: default_queue_backend(),
            azure_queue_url: None,
            redis_url: default_redis_url(),
            redis_key: default_redis_key(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: default_pool_size(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8081);
        assert_eq!(settings.push.engine, "noop");
        assert_eq!(settings.push.token_refresh_margin_seconds, 300);
        assert_eq!(settings.internal_client_id, "internal.notifications");
        assert_eq!(settings.queue.backend, "memory");
        assert!(settings.installation.id.is_nil());
    }

    #[test]
    fn test_deserialize_partial_document() {
        let settings: Settings = Config::builder()
            .add_source(config::File::from_str(
                r#"
                push_relay_base_uri = "https://push.example.com"

                [push]
                engine = "relay"

                [installation]
                id = "5b2a6c3e-2f4d-4c1e-9a7b-0d8e6f5a4b3c"
                key = "installation-key"
                identity_uri = "https://identity.example.com"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.push.engine, "relay");
        assert_eq!(settings.push.http_timeout_seconds, 30);
        assert_eq!(
            settings.push_relay_base_uri.as_deref(),
            Some("https://push.example.com")
        );
        assert_eq!(settings.installation.key.as_deref(), Some("installation-key"));
        assert_eq!(settings.server.port, 8081);
    }
}
