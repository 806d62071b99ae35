//! Error types for parley-client

use thiserror::Error;

/// Result type alias using parley-client Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the chat endpoint
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed (connectivity, DNS, body decoding)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Endpoint returned a non-success status
    #[error("endpoint returned status {status}: {detail}")]
    Endpoint { status: u16, detail: String },
}

impl Error {
    /// Create an endpoint error from a status code and classified detail text
    pub fn endpoint(status: u16, detail: impl Into<String>) -> Self {
        Self::Endpoint {
            status,
            detail: detail.into(),
        }
    }

    /// The text shown to the user when this error is folded into the
    /// transcript. For endpoint errors that is the classified detail alone;
    /// transport errors use their display form.
    pub fn user_message(&self) -> String {
        match self {
            Error::Endpoint { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status code, if the endpoint got far enough to send one
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Endpoint { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            Error::Json(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_user_message_is_bare_detail() {
        let e = Error::endpoint(500, "model unavailable");
        assert_eq!(e.user_message(), "model unavailable");
        // but the display form keeps the status for logs
        assert!(e.to_string().contains("500"));
    }

    #[test]
    fn test_endpoint_status() {
        assert_eq!(Error::endpoint(503, "down").status(), Some(503));
    }

    #[test]
    fn test_json_error_user_message_nonempty() {
        let e = Error::from(serde_json::from_str::<serde_json::Value>("{").unwrap_err());
        assert!(!e.user_message().is_empty());
        assert_eq!(e.status(), None);
    }
}
