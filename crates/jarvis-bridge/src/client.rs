//! Host-side client for a running bridge.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors talking to a bridge.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Request could not be sent or the response could not be read.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The bridge answered with an error.
    #[error("bridge returned {status}: {message}")]
    Rejected { status: u16, message: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Serialize)]
struct NotificationPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    body: &'a str,
}

/// Minimal client for the bridge's host-facing endpoints.
#[derive(Debug, Clone)]
pub struct BridgeClient {
    client: Client,
    base_url: String,
}

impl BridgeClient {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|source| ClientError::Request {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Queue a notification for the phone. A missing title lets the bridge
    /// pick its default.
    pub async fn send_notification(&self, title: Option<&str>, body: &str) -> ClientResult<()> {
        let url = format!("{}/api/notifications", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&NotificationPayload { title, body })
            .send()
            .await
            .map_err(|source| ClientError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = match response.json::<Value>().await {
            Ok(body) => body["error"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string(),
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };
        Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    /// Fetch `/status` from the bridge.
    pub async fn status(&self) -> ClientResult<Value> {
        let url = format!("{}/status", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ClientError::Request {
                url: url.clone(),
                source,
            })?;
        response
            .json()
            .await
            .map_err(|source| ClientError::Request { url, source })
    }
}
