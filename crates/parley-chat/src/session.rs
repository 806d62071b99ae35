//! The session controller: one request/reply round trip per user turn

use std::sync::Arc;

use parking_lot::Mutex;
use parley_client::Message;
use tokio::sync::broadcast;

use crate::{conversation::Conversation, events::SessionEvent, transport::Transport};

/// Greeting seeded into every new conversation
pub const DEFAULT_GREETING: &str = "Hello! How can I help you today?";

/// Prefix shown before the classified detail when a turn fails
pub const ERROR_PREFIX: &str = "Sorry, there was an error: ";

/// Fallback detail when an error carries no text at all
const UNKNOWN_ERROR: &str = "Unknown error";

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Assistant greeting seeded into the transcript
    pub greeting: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

/// Result of a [`Session::submit`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A round trip ran and exactly one reply was appended
    Completed,
    /// The submission was dropped without any state change
    Rejected(RejectReason),
}

/// Why a submission was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The draft was empty or whitespace-only
    EmptyDraft,
    /// A request is already outstanding
    RequestInFlight,
}

/// The session: sole owner and sole writer of the conversation.
///
/// Every accepted submission moves the session Idle -> Submitting -> Idle.
/// While Submitting, reads stay available but further submissions are
/// rejected by the pending guard.
pub struct Session {
    conversation: Mutex<Conversation>,
    transport: Arc<dyn Transport>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl Session {
    /// Create a new session
    pub fn new(config: SessionConfig, transport: Arc<dyn Transport>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            conversation: Mutex::new(Conversation::new(config.greeting)),
            transport,
            event_tx,
        }
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Clone of the current conversation state
    pub fn snapshot(&self) -> Conversation {
        self.conversation.lock().clone()
    }

    /// Clone of the transcript, in arrival order
    pub fn messages(&self) -> Vec<Message> {
        self.conversation.lock().messages().to_vec()
    }

    /// Whether a request is currently outstanding
    pub fn pending(&self) -> bool {
        self.conversation.lock().pending()
    }

    /// The current draft text
    pub fn draft(&self) -> String {
        self.conversation.lock().draft().to_string()
    }

    /// Replace the draft with the presentation layer's current input text
    pub fn set_draft(&self, text: impl Into<String>) {
        self.conversation.lock().set_draft(text.into());
    }

    /// Submit the current draft.
    ///
    /// An empty or whitespace-only draft, or a submission while a request is
    /// outstanding, is rejected with no observable effect. Otherwise the
    /// draft is committed to the transcript and cleared before the network
    /// call, one request goes out, and exactly one assistant message comes
    /// back — the reply on success, a synthesized error message on failure.
    /// The pending flag clears on every path once the round trip resolves.
    pub async fn submit(&self) -> SubmitOutcome {
        // Guard and capture under one lock so rapid submissions cannot
        // interleave between the check and the dispatch.
        let user_message = {
            let mut conv = self.conversation.lock();
            if conv.pending() {
                return SubmitOutcome::Rejected(RejectReason::RequestInFlight);
            }
            if conv.draft().trim().is_empty() {
                return SubmitOutcome::Rejected(RejectReason::EmptyDraft);
            }
            let message = Message::user(conv.take_draft());
            conv.push(message.clone());
            conv.set_pending(true);
            message
        };
        let _ = self.event_tx.send(SessionEvent::MessageAppended {
            message: user_message.clone(),
        });
        let _ = self
            .event_tx
            .send(SessionEvent::PendingChanged { pending: true });

        tracing::debug!(chars = user_message.content.len(), "submitting turn");

        // Sole suspension point. Errors come back as values, so the single
        // fall-through below is the guaranteed-cleanup path.
        let content = match self.transport.send(&user_message.content).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(error = %err, "turn failed");
                let mut detail = err.user_message();
                if detail.trim().is_empty() {
                    detail = UNKNOWN_ERROR.to_string();
                }
                format!("{ERROR_PREFIX}{detail}")
            }
        };

        let reply_message = Message::assistant(content);
        {
            let mut conv = self.conversation.lock();
            conv.push(reply_message.clone());
            conv.set_pending(false);
        }
        let _ = self.event_tx.send(SessionEvent::MessageAppended {
            message: reply_message,
        });
        let _ = self
            .event_tx
            .send(SessionEvent::PendingChanged { pending: false });

        SubmitOutcome::Completed
    }

    /// Set the draft and submit it in one step
    pub async fn submit_text(&self, text: impl Into<String>) -> SubmitOutcome {
        self.set_draft(text);
        self.submit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parley_client::{Error, Role};
    use std::sync::Arc;

    /// A mock transport that returns canned replies in order.
    struct MockTransport {
        replies: Mutex<Vec<Result<String, Error>>>,
    }

    impl MockTransport {
        fn new(replies: Vec<Result<String, Error>>) -> Self {
            Self {
                replies: Mutex::new(replies),
            }
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, _message: &str) -> parley_client::Result<String> {
            let mut replies = self.replies.lock();
            if replies.is_empty() {
                Ok("done".to_string())
            } else {
                replies.remove(0)
            }
        }
    }

    fn make_session(replies: Vec<Result<String, Error>>) -> Session {
        Session::new(SessionConfig::default(), Arc::new(MockTransport::new(replies)))
    }

    fn json_error() -> Error {
        Error::from(serde_json::from_str::<serde_json::Value>("{").unwrap_err())
    }

    #[test]
    fn test_greeting_seeds_history() {
        let session = make_session(vec![]);
        let messages = session.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Assistant);
        assert_eq!(messages[0].content, DEFAULT_GREETING);
        assert!(!session.pending());
    }

    #[tokio::test]
    async fn test_round_trip_success() {
        let session = make_session(vec![Ok("Hi! How can I help?".to_string())]);

        let outcome = session.submit_text("Hello").await;
        assert_eq!(outcome, SubmitOutcome::Completed);

        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "Hello");
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[2].content, "Hi! How can I help?");
        assert!(!session.pending());
        assert!(session.draft().is_empty());
    }

    #[tokio::test]
    async fn test_reply_appended_verbatim() {
        // No trimming or reformatting of the reply text
        let session = make_session(vec![Ok("  Hi there \n".to_string())]);
        session.submit_text("hi").await;
        assert_eq!(session.messages().last().unwrap().content, "  Hi there \n");
    }

    #[tokio::test]
    async fn test_user_text_committed_verbatim() {
        // Validation trims, the committed message does not
        let session = make_session(vec![Ok("ok".to_string())]);
        session.submit_text("  Hello  ").await;
        assert_eq!(session.messages()[1].content, "  Hello  ");
    }

    #[tokio::test]
    async fn test_endpoint_error_becomes_message() {
        let session = make_session(vec![Err(Error::endpoint(500, "model unavailable"))]);

        let outcome = session.submit_text("What's the weather?").await;
        assert_eq!(outcome, SubmitOutcome::Completed);

        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages.last().unwrap().role, Role::Assistant);
        assert_eq!(
            messages.last().unwrap().content,
            "Sorry, there was an error: model unavailable"
        );
        assert!(!session.pending());
    }

    #[tokio::test]
    async fn test_transport_error_becomes_message() {
        let session = make_session(vec![Err(json_error())]);

        session.submit_text("hi").await;

        let last = session.messages().last().cloned().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert!(last.content.starts_with(ERROR_PREFIX));
        assert!(last.content.len() > ERROR_PREFIX.len());
        assert!(!session.pending());
    }

    #[tokio::test]
    async fn test_blank_error_detail_falls_back_to_unknown() {
        let session = make_session(vec![Err(Error::endpoint(500, ""))]);
        session.submit_text("hi").await;
        assert_eq!(
            session.messages().last().unwrap().content,
            "Sorry, there was an error: Unknown error"
        );
    }

    #[tokio::test]
    async fn test_empty_draft_rejected() {
        let session = make_session(vec![]);
        let mut events = session.subscribe();

        assert_eq!(
            session.submit().await,
            SubmitOutcome::Rejected(RejectReason::EmptyDraft)
        );
        assert_eq!(
            session.submit_text("   \t\n").await,
            SubmitOutcome::Rejected(RejectReason::EmptyDraft)
        );

        assert_eq!(session.messages().len(), 1);
        assert!(!session.pending());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_submit_while_pending_rejected() {
        /// Transport that holds the request open until released.
        struct GatedTransport {
            gate: tokio::sync::Notify,
        }

        #[async_trait]
        impl Transport for GatedTransport {
            async fn send(&self, _message: &str) -> parley_client::Result<String> {
                self.gate.notified().await;
                Ok("finally".to_string())
            }
        }

        let transport = Arc::new(GatedTransport {
            gate: tokio::sync::Notify::new(),
        });
        let session = Arc::new(Session::new(SessionConfig::default(), transport.clone()));

        let first = tokio::spawn({
            let session = session.clone();
            async move { session.submit_text("first").await }
        });

        // Wait for the first submission to reach its suspension point
        while !session.pending() {
            tokio::task::yield_now().await;
        }

        assert_eq!(
            session.submit_text("second").await,
            SubmitOutcome::Rejected(RejectReason::RequestInFlight)
        );

        transport.gate.notify_one();
        assert_eq!(first.await.unwrap(), SubmitOutcome::Completed);

        // Only the first turn made it into the transcript
        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].content, "first");
        assert_eq!(messages[2].content, "finally");
        assert!(!session.pending());
    }

    #[tokio::test]
    async fn test_one_reply_per_turn_across_turns() {
        let session = make_session(vec![Ok("r1".to_string()), Ok("r2".to_string())]);
        session.submit_text("q1").await;
        session.submit_text("q2").await;

        let messages = session.messages();
        assert_eq!(messages.len(), 5);
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant
            ]
        );
    }

    #[tokio::test]
    async fn test_event_stream_mirrors_mutations_in_order() {
        let session = make_session(vec![Ok("reply".to_string())]);
        let mut events = session.subscribe();

        session.submit_text("hello").await;

        match events.try_recv().unwrap() {
            SessionEvent::MessageAppended { message } => {
                assert_eq!(message.role, Role::User);
                assert_eq!(message.content, "hello");
            }
            other => panic!("expected user MessageAppended, got {other:?}"),
        }
        match events.try_recv().unwrap() {
            SessionEvent::PendingChanged { pending } => assert!(pending),
            other => panic!("expected PendingChanged(true), got {other:?}"),
        }
        match events.try_recv().unwrap() {
            SessionEvent::MessageAppended { message } => {
                assert_eq!(message.role, Role::Assistant);
                assert_eq!(message.content, "reply");
            }
            other => panic!("expected assistant MessageAppended, got {other:?}"),
        }
        match events.try_recv().unwrap() {
            SessionEvent::PendingChanged { pending } => assert!(!pending),
            other => panic!("expected PendingChanged(false), got {other:?}"),
        }
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_reads_are_pure() {
        let session = make_session(vec![Ok("reply".to_string())]);
        session.submit_text("hello").await;

        let mut events = session.subscribe();
        let before = session.snapshot();
        // Re-reading an unchanged snapshot mutates nothing and emits nothing
        let _ = session.messages();
        let _ = session.pending();
        let _ = session.draft();
        assert_eq!(session.snapshot(), before);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_custom_greeting() {
        let config = SessionConfig {
            greeting: "Welcome aboard".to_string(),
        };
        let session = Session::new(config, Arc::new(MockTransport::new(vec![])));
        assert_eq!(session.messages()[0].content, "Welcome aboard");
    }
}
