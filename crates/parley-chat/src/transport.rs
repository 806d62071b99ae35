//! Transport abstraction between the session and the chat endpoint

use async_trait::async_trait;
use parley_client::{ChatClient, Result};

/// Transport for delivering one user message and obtaining the reply.
///
/// The session calls this exactly once per accepted submission. A failed
/// call is terminal for that turn: no retries are attempted here or above.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver one user message and return the reply text
    async fn send(&self, message: &str) -> Result<String>;
}

/// Transport backed by a live chat endpoint
pub struct EndpointTransport {
    client: ChatClient,
}

impl EndpointTransport {
    /// Create a transport around an existing client
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for EndpointTransport {
    async fn send(&self, message: &str) -> Result<String> {
        self.client.send(message).await
    }
}
