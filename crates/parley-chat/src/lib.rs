//! parley-chat: conversation state and submission lifecycle
//!
//! This crate holds the conversation store and the session controller that
//! turns a drafted user input into one request/reply round trip against a
//! chat endpoint.

pub mod conversation;
pub mod events;
pub mod session;
pub mod transport;

pub use conversation::Conversation;
pub use events::SessionEvent;
pub use session::{
    DEFAULT_GREETING, ERROR_PREFIX, RejectReason, Session, SessionConfig, SubmitOutcome,
};
pub use transport::{EndpointTransport, Transport};
