use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::push::PushType;

/// Errors raised while building or delivering a push.
///
/// A device lookup miss is not represented here: it resolves to a `null`
/// device id and the delivery continues.
#[derive(Error, Debug)]
pub enum PushError {
    /// Non-success HTTP status, connection failure, or queue failure
    #[error("Transport error: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// Token endpoint failure or an unusable token response
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Missing base URI, credential, or backend at construction time
    #[error("Configuration error: {0}")]
    Config(String),

    /// The device lookup backend itself failed
    #[error("Device lookup error: {0}")]
    DeviceLookup(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Push type {0:?} is not a cipher push type")]
    UnsupportedPushType(PushType),
}

impl PushError {
    pub fn transport(message: impl Into<String>) -> Self {
        PushError::Transport {
            status: None,
            message: message.into(),
        }
    }

    pub fn transport_status(status: u16, message: impl Into<String>) -> Self {
        PushError::Transport {
            status: Some(status),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for PushError {
    fn from(err: reqwest::Error) -> Self {
        PushError::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl From<redis::RedisError> for PushError {
    fn from(err: redis::RedisError) -> Self {
        PushError::transport(format!("Redis error: {}", err))
    }
}

impl From<sqlx::Error> for PushError {
    fn from(err: sqlx::Error) -> Self {
        PushError::DeviceLookup(err.to_string())
    }
}

/// Errors surfaced by the HTTP layer.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or wrong API key on the event intake
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Push error: {0}")]
    Push(#[from] PushError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

fn redact(message: String, fallback: &str) -> String {
    if is_production() {
        fallback.to_string()
    } else {
        message
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Push(e) => match e {
                PushError::Config(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", e.to_string())
                }
                PushError::UnsupportedPushType(_) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
                }
                PushError::Auth(_) => (StatusCode::BAD_GATEWAY, "PUSH_AUTH_ERROR", e.to_string()),
                PushError::DeviceLookup(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DEVICE_LOOKUP_ERROR",
                    e.to_string(),
                ),
                PushError::Transport { .. } | PushError::Serialization(_) => {
                    (StatusCode::BAD_GATEWAY, "PUSH_DELIVERY_ERROR", e.to_string())
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, log_message) = self.parts();

        let client_message = if status.is_server_error() {
            redact(log_message.clone(), "Push delivery failed")
        } else {
            log_message.clone()
        };

        // Always log the detailed error server-side
        tracing::error!(
            code = %code,
            status = %status.as_u16(),
            message = %log_message,
            "API error"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: client_message,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
