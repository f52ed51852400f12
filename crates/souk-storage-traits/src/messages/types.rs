//! Types for the messages module

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::ids::{MessageId, UserId};
use crate::timestamp::Timestamp;
use crate::ConversationId;

/// A chat message as submitted by a sender, before the backend assigns an
/// id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChatMessage {
    /// The sending user
    pub sender: UserId,
    /// Display name snapshot of the sender at send time
    pub sender_name: Option<String>,
    /// Avatar URL snapshot of the sender at send time
    pub sender_avatar: Option<String>,
    /// The message body
    pub body: String,
}

impl NewChatMessage {
    /// A message with no profile snapshot
    pub fn text(sender: UserId, body: impl Into<String>) -> Self {
        Self {
            sender,
            sender_name: None,
            sender_avatar: None,
            body: body.into(),
        }
    }
}

/// A stored chat message.
///
/// Messages are immutable once written: there is no edit or delete. The
/// sender display fields are a profile snapshot taken at send time and are
/// never refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Server-assigned identifier
    pub id: MessageId,
    /// The conversation this message belongs to
    pub conversation_id: ConversationId,
    /// The sending user
    pub sender: UserId,
    /// Display name snapshot of the sender at send time
    pub sender_name: Option<String>,
    /// Avatar URL snapshot of the sender at send time
    pub sender_avatar: Option<String>,
    /// The message body
    pub body: String,
    /// Server-assigned send timestamp
    pub sent_at: Timestamp,
}

impl ChatMessage {
    /// Compares two messages for log ordering.
    ///
    /// Messages are sorted ascending by `sent_at` with the id as a
    /// deterministic tiebreaker. This ordering is the single source of
    /// truth used by storage implementations and by message feeds.
    pub fn log_order_cmp(&self, other: &Self) -> Ordering {
        self.sent_at
            .cmp(&other.sent_at)
            .then_with(|| self.id.cmp(&other.id))
    }
}
