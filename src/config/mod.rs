mod settings;

pub use settings::{
    ApiConfig, BaseUriConfig, DatabaseConfig, InstallationConfig, OtelConfig, PushConfig,
    QueueConfig, ServerConfig, Settings,
};
