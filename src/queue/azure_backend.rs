//! Azure Storage Queue client over the queue service REST API.

use async_trait::async_trait;
use reqwest::Url;

use crate::error::PushError;

use super::QueueClient;

/// Storage service version sent with every request.
pub const AZURE_STORAGE_VERSION: &str = "2021-08-06";

/// Writes messages to an Azure Storage queue addressed by a SAS URL.
///
/// `queue_url` has the shape
/// `https://{account}.queue.core.windows.net/{queue}?{sas}`; messages are
/// posted to `{queue}/messages?{sas}`.
pub struct AzureStorageQueueClient {
    http: reqwest::Client,
    messages_url: Url,
}

impl AzureStorageQueueClient {
    pub fn new(http: reqwest::Client, queue_url: &str) -> Result<Self, PushError> {
        let mut url = Url::parse(queue_url)
            .map_err(|e| PushError::Config(format!("invalid Azure queue URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| PushError::Config("Azure queue URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("messages");

        Ok(Self {
            http,
            messages_url: url,
        })
    }

    /// Target of the `Put Message` call, SAS query included.
    pub fn messages_url(&self) -> &Url {
        &self.messages_url
    }
}

#[async_trait]
impl QueueClient for AzureStorageQueueClient {
    fn backend(&self) -> &'static str {
        "azure"
    }

    async fn send_message(&self, message: &str) -> Result<(), PushError> {
        let body = format!(
            "<QueueMessage><MessageText>{}</MessageText></QueueMessage>",
            xml_escape(message)
        );

        let response = self
            .http
            .post(self.messages_url.clone())
            .header("x-ms-version", AZURE_STORAGE_VERSION)
            .header("content-type", "application/xml")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PushError::transport_status(
                status.as_u16(),
                format!("Azure queue rejected message: {}", detail),
            ));
        }

        tracing::debug!(bytes = message.len(), "Message written to Azure queue");
        Ok(())
    }
}

fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
