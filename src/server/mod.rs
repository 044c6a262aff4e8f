mod app;
mod middleware;
mod state;

pub use app::create_app;
pub use middleware::{api_key_auth, device_identifier, DEVICE_IDENTIFIER_HEADER};
pub use state::AppState;
