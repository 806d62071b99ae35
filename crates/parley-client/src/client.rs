//! Chat endpoint client

use std::time::Duration;

use crate::{
    error::{Error, Result},
    types::{ChatReply, ChatRequest, ErrorBody, Health},
};

/// Detail text used when a structured error body carries no usable detail
const GENERIC_DETAIL: &str = "An error occurred";

/// Client for a parley-compatible chat service
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
}

impl ChatClient {
    /// Create a new client for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: normalize_base_url(base_url.into()),
        }
    }

    /// Create a client with a whole-request timeout. Without one, requests
    /// wait as long as the endpoint takes.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url.into()),
        })
    }

    /// The base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one user message and return the generated reply text.
    ///
    /// Non-2xx responses are classified into [`Error::Endpoint`] with the
    /// detail extracted from the body: a structured JSON `detail` field when
    /// the endpoint sends one, the raw body text otherwise, or a synthesized
    /// `Error <status>` when the body is empty.
    pub async fn send(&self, message: &str) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        tracing::debug!(%url, "sending chat request");

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest {
                message: message.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let reply: ChatReply = response.json().await?;
            return Ok(reply.message);
        }

        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));
        let body = response.text().await.unwrap_or_default();
        let detail = classify_error_body(status.as_u16(), is_json, &body);

        tracing::warn!(status = status.as_u16(), %detail, "chat request failed");
        Err(Error::endpoint(status.as_u16(), detail))
    }

    /// Probe the endpoint's health route
    pub async fn health(&self) -> Result<Health> {
        let url = format!("{}/api/health", self.base_url);
        tracing::debug!(%url, "probing endpoint health");

        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

fn normalize_base_url(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

/// Extract the user-facing detail text from a non-2xx response body.
///
/// `is_json` reflects the response's content-type header; a mislabelled body
/// that fails to parse falls back to the plain-text branch.
fn classify_error_body(status: u16, is_json: bool, body: &str) -> String {
    if is_json {
        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
            return match parsed.detail {
                Some(detail) if !detail.is_empty() => detail,
                _ => GENERIC_DETAIL.to_string(),
            };
        }
    }

    if body.trim().is_empty() {
        format!("Error {status}")
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_structured_detail() {
        let detail = classify_error_body(500, true, r#"{"detail":"model unavailable"}"#);
        assert_eq!(detail, "model unavailable");
    }

    #[test]
    fn test_classify_structured_without_detail() {
        assert_eq!(classify_error_body(500, true, "{}"), GENERIC_DETAIL);
        assert_eq!(
            classify_error_body(500, true, r#"{"detail":""}"#),
            GENERIC_DETAIL
        );
    }

    #[test]
    fn test_classify_json_header_but_unparseable_body() {
        // Mislabelled content-type: fall back to the raw text
        assert_eq!(
            classify_error_body(502, true, "Bad Gateway"),
            "Bad Gateway"
        );
    }

    #[test]
    fn test_classify_plain_text_body() {
        assert_eq!(
            classify_error_body(503, false, "service restarting"),
            "service restarting"
        );
    }

    #[test]
    fn test_classify_empty_body_uses_status() {
        assert_eq!(classify_error_body(500, false, ""), "Error 500");
        assert_eq!(classify_error_body(404, false, "  \n"), "Error 404");
        assert_eq!(classify_error_body(500, true, ""), "Error 500");
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = ChatClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
