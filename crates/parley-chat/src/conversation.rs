//! Conversation state: message history, in-flight flag, and draft.

use parley_client::Message;

/// Conversation state: the ordered transcript plus the in-flight flag and
/// the not-yet-submitted draft.
///
/// The history is append-only: messages are never reordered, edited, or
/// removed. Mutators are crate-private so all writes go through the
/// [`Session`](crate::Session); everyone else sees read-only snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    /// Ordered transcript; index is arrival order
    history: Vec<Message>,
    /// Whether a request is currently outstanding
    pending: bool,
    /// Uncommitted input text
    draft: String,
}

impl Conversation {
    /// Create a conversation seeded with an assistant greeting, so the
    /// transcript is never empty.
    pub(crate) fn new(greeting: impl Into<String>) -> Self {
        Self {
            history: vec![Message::assistant(greeting)],
            pending: false,
            draft: String::new(),
        }
    }

    /// The transcript, in arrival order
    pub fn messages(&self) -> &[Message] {
        &self.history
    }

    /// Whether a request is currently outstanding
    pub fn pending(&self) -> bool {
        self.pending
    }

    /// The uncommitted input text
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.history.push(message);
    }

    pub(crate) fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    pub(crate) fn set_draft(&mut self, draft: String) {
        self.draft = draft;
    }

    /// Capture the draft for submission, leaving it empty
    pub(crate) fn take_draft(&mut self) -> String {
        std::mem::take(&mut self.draft)
    }
}
