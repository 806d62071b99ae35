//! Core types for chat exchanges

use serde::{Deserialize, Serialize};

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Get a human-readable name for this role
    pub fn name(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single entry in the conversation transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who produced the content; immutable once created
    pub role: Role,
    /// Text payload
    pub content: String,
    /// Creation time in epoch milliseconds
    #[serde(default)]
    pub timestamp: i64,
}

impl Message {
    /// Create a user message stamped with the current time
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Create an assistant message stamped with the current time
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Whether this message came from the user
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Request body for `POST /api/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The submitted user text, verbatim
    pub message: String,
}

/// Success body returned by `POST /api/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    /// The generated reply text
    pub message: String,
}

/// Structured error body returned by the endpoint on non-2xx statuses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error detail; the endpoint may omit it
    #[serde(default)]
    pub detail: Option<String>,
}

/// Body returned by `GET /api/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Overall service status ("ok", "degraded", ...)
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
    }

    #[test]
    fn test_message_roundtrip_without_timestamp() {
        // Wire payloads carry only role and content; timestamp defaults
        let msg: Message =
            serde_json::from_str(r#"{"role":"user","content":"hello"}"#).unwrap();
        assert!(msg.is_user());
        assert_eq!(msg.content, "hello");
        assert_eq!(msg.timestamp, 0);
    }

    #[test]
    fn test_error_body_detail_optional() {
        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.detail.is_none());
        let body: ErrorBody =
            serde_json::from_str(r#"{"detail":"model unavailable"}"#).unwrap();
        assert_eq!(body.detail.as_deref(), Some("model unavailable"));
    }
}
