//! API layer - HTTP endpoint handlers.

mod events;
mod health;
mod metrics;
mod routes;

pub use events::{publish_event, EventAccepted, PushEvent};
pub use health::{health, HealthResponse};
pub use metrics::prometheus_metrics;
pub use routes::api_routes;
