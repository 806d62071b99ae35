//! Session event types

use parley_client::Message;
use serde::{Deserialize, Serialize};

/// Events emitted on every conversation mutation, in mutation order. The
/// presentation layer subscribes to these to re-render the transcript and
/// the loading indicator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A message was appended to the transcript
    MessageAppended { message: Message },

    /// The in-flight flag changed
    PendingChanged { pending: bool },
}
