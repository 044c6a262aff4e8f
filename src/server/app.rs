use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api::api_routes;

use super::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
