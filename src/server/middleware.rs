use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use super::AppState;
use crate::error::AppError;

/// Header carrying the identifier of the device that triggered the event.
pub const DEVICE_IDENTIFIER_HEADER: &str = "X-Device-Identifier";

/// API Key authentication middleware
/// Validates X-API-Key header against configured api.key
pub async fn api_key_auth(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // If no API key is configured, allow all requests (development mode)
    let Some(expected_key) = &state.settings.api.key else {
        return Ok(next.run(req).await);
    };

    let api_key = req
        .headers()
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok());

    match api_key {
        Some(key) if key == expected_key => Ok(next.run(req).await),
        Some(_) => {
            tracing::warn!("Invalid API key provided");
            Err(AppError::Auth("Invalid API key".to_string()))
        }
        None => {
            tracing::warn!("Missing API key header");
            Err(AppError::Auth("Missing API key".to_string()))
        }
    }
}

/// Device identifier sent by the caller, if any.
pub fn device_identifier(headers: &HeaderMap) -> Option<String> {
    headers
        .get(DEVICE_IDENTIFIER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::HeaderValue;

    #[test]
    fn test_device_identifier_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(device_identifier(&headers), None);

        headers.insert(DEVICE_IDENTIFIER_HEADER, HeaderValue::from_static("  "));
        assert_eq!(device_identifier(&headers), None);

        headers.insert(DEVICE_IDENTIFIER_HEADER, HeaderValue::from_static("dev-1"));
        assert_eq!(device_identifier(&headers).as_deref(), Some("dev-1"));
    }
}
