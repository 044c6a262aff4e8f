//! Named HTTP clients shared across pushes.

use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;

use crate::error::PushError;

/// Client used for delivery calls.
pub const PUSH_CLIENT: &str = "client";

/// Client used for token endpoint calls.
pub const IDENTITY_CLIENT: &str = "identity";

/// Hands out one `reqwest::Client` per logical name.
///
/// Clients are built on first use and reused afterwards, so connection pools
/// survive across pushes.
pub struct HttpClientFactory {
    timeout: Duration,
    clients: DashMap<String, reqwest::Client>,
}

impl HttpClientFactory {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            clients: DashMap::new(),
        }
    }

    pub fn client(&self, name: &str) -> Result<reqwest::Client, PushError> {
        if let Some(client) = self.clients.get(name) {
            return Ok(client.clone());
        }

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("vault-push-service/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PushError::Config(format!("failed to build HTTP client {}: {}", name, e)))?;

        // Another task may have raced us here; keep whichever landed first.
        let client = self
            .clients
            .entry(name.to_string())
            .or_insert(client)
            .clone();

        tracing::debug!(client = %name, "HTTP client created");
        Ok(client)
    }
}

/// POST `body` as JSON with a bearer token; any non-2xx status is a
/// transport error carrying that status.
pub(crate) async fn post_json<T: Serialize + ?Sized>(
    http: &reqwest::Client,
    url: &str,
    token: &str,
    body: &T,
) -> Result<(), PushError> {
    let response = http.post(url).bearer_auth(token).json(body).send().await?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(PushError::transport_status(
            status.as_u16(),
            format!("{} returned {}: {}", url, status.as_u16(), detail),
        ));
    }

    Ok(())
}

impl Default for HttpClientFactory {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clients_are_cached_by_name() {
        let factory = HttpClientFactory::default();
        factory.client(PUSH_CLIENT).unwrap();
        factory.client(PUSH_CLIENT).unwrap();
        factory.client(IDENTITY_CLIENT).unwrap();
        assert_eq!(factory.clients.len(), 2);
    }

    #[tokio::test]
    async fn test_post_json_maps_status() {
        use wiremock::matchers::{header, method};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer t0k"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let err = post_json(
            &reqwest::Client::new(),
            &format!("{}/send", server.uri()),
            "t0k",
            &serde_json::json!({ "Type": 0 }),
        )
        .await
        .unwrap_err();

        match err {
            PushError::Transport { status, message } => {
                assert_eq!(status, Some(503));
                assert!(message.contains("unavailable"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
