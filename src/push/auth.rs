//! OAuth2 client-credentials token cache.
//!
//! One [`TokenProvider`] instance is owned by each HTTP engine. The cached
//! token moves through `Absent -> Valid -> Expiring -> Expired`; any state
//! other than `Valid` triggers a fetch on the next call.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};

use crate::error::PushError;
use crate::metrics::TokenMetrics;

use super::context::Clock;

/// Default lifetime left on a token below which it is refreshed.
pub const DEFAULT_REFRESH_MARGIN_SECONDS: i64 = 300;

/// Client-credentials grant parameters.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Absent,
    Valid,
    /// Still usable but inside the refresh margin
    Expiring,
    Expired,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
    /// Start of the refresh window, never earlier than half the lifetime
    refresh_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: i64,
}

/// Caches a bearer token and refreshes it before it expires.
///
/// Concurrent callers that find no usable token share a single token
/// endpoint request. Callers holding a valid token only take a read lock.
pub struct TokenProvider {
    name: String,
    http: reqwest::Client,
    token_uri: String,
    credentials: ClientCredentials,
    clock: Arc<dyn Clock>,
    refresh_margin: Duration,
    cache: RwLock<Option<CachedToken>>,
    refresh: Mutex<()>,
}

impl TokenProvider {
    /// `identity_uri` is the identity server base; the token endpoint is
    /// `{identity_uri}/connect/token`.
    pub fn new(
        name: impl Into<String>,
        http: reqwest::Client,
        identity_uri: &str,
        credentials: ClientCredentials,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            name: name.into(),
            http,
            token_uri: format!("{}/connect/token", identity_uri.trim_end_matches('/')),
            credentials,
            clock,
            refresh_margin: Duration::seconds(DEFAULT_REFRESH_MARGIN_SECONDS),
            cache: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    pub fn token_uri(&self) -> &str {
        &self.token_uri
    }

    pub async fn state(&self) -> TokenState {
        let cache = self.cache.read().await;
        self.classify(cache.as_ref())
    }

    /// Return a bearer token, fetching one if none is valid.
    pub async fn access_token(&self) -> Result<String, PushError> {
        if let Some(token) = self.valid_token().await {
            return Ok(token);
        }

        let _guard = self.refresh.lock().await;

        // Whoever held the lock before us may have refreshed already
        if let Some(token) = self.valid_token().await {
            return Ok(token);
        }

        let previous = self.state().await;
        let token = match self.fetch().await {
            Ok(token) => token,
            Err(e) => {
                TokenMetrics::record_failed(&self.name);
                tracing::warn!(client = %self.name, error = %e, "Token refresh failed");
                return Err(e);
            }
        };
        TokenMetrics::record_refreshed(&self.name);

        tracing::debug!(
            client = %self.name,
            previous_state = ?previous,
            expires_at = %token.expires_at,
            "Access token refreshed"
        );

        let value = token.value.clone();
        *self.cache.write().await = Some(token);
        Ok(value)
    }

    async fn valid_token(&self) -> Option<String> {
        let cache = self.cache.read().await;
        match self.classify(cache.as_ref()) {
            TokenState::Valid => cache.as_ref().map(|t| t.value.clone()),
            _ => None,
        }
    }

    fn classify(&self, token: Option<&CachedToken>) -> TokenState {
        let Some(token) = token else {
            return TokenState::Absent;
        };

        let now = self.clock.now();
        if token.expires_at <= now {
            TokenState::Expired
        } else if token.refresh_at <= now {
            TokenState::Expiring
        } else {
            TokenState::Valid
        }
    }

    #[tracing::instrument(name = "push.token_refresh", skip(self), fields(client = %self.name))]
    async fn fetch(&self) -> Result<CachedToken, PushError> {
        let params = [
            ("grant_type", "client_credentials"),
            ("scope", self.credentials.scope.as_str()),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(&self.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| PushError::Auth(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PushError::Auth(format!(
                "token endpoint returned {}",
                status.as_u16()
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| PushError::Auth(format!("invalid token response: {}", e)))?;

        let now = self.clock.now();
        let expires_at = match body.expires_in {
            Some(seconds) => Duration::try_seconds(seconds)
                .and_then(|lifetime| now.checked_add_signed(lifetime))
                .ok_or_else(|| {
                    PushError::Auth(format!("token lifetime out of range: {}s", seconds))
                })?,
            None => jwt_expiry(&body.access_token).ok_or_else(|| {
                PushError::Auth("token response carried no expiry".to_string())
            })?,
        };

        if expires_at <= now {
            return Err(PushError::Auth(format!(
                "token response already expired at {}",
                expires_at
            )));
        }

        let margin = self.refresh_margin.min((expires_at - now) / 2);
        let refresh_at = expires_at
            .checked_sub_signed(margin)
            .unwrap_or(expires_at);

        Ok(CachedToken {
            value: body.access_token,
            expires_at,
            refresh_at,
        })
    }
}

/// Read the `exp` claim without verifying the signature. The token is only
/// inspected to schedule the next refresh.
fn jwt_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    DateTime::from_timestamp(data.claims.exp, 0)
}
