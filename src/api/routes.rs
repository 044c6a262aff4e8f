use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::server::{api_key_auth, AppState};

use super::events::publish_event;
use super::health::health;
use super::metrics::prometheus_metrics;

pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        // Domain events
        .nest(
            "/api/v1",
            Router::new()
                .route("/events", post(publish_event))
                .route_layer(middleware::from_fn_with_state(state, api_key_auth)),
        )
}
