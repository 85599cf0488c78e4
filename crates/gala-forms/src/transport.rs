//! Submission transport

use async_trait::async_trait;
use serde_json::Value;

/// Status and decoded body of a submission request
#[derive(Clone, Debug, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

impl TransportResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The server's `{error}` message, or a generic one naming the status
    pub fn error_message(&self) -> String {
        self.body
            .get("error")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map(String::from)
            .unwrap_or_else(|| format!("Request failed with status {}", self.status))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Sends a JSON body to a submit endpoint
#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<TransportResponse, TransportError>;
}

/// reqwest-backed transport against a registration server
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SubmissionTransport for HttpTransport {
    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<TransportResponse, TransportError> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(url = %url, "submitting form");
        let resp = self.client.post(&url).json(body).send().await?;
        let status = resp.status().as_u16();
        // Error pages are not always JSON
        let body = resp.json::<Value>().await.unwrap_or(Value::Null);
        Ok(TransportResponse { status, body })
    }
}
