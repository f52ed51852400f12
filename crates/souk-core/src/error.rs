//! Souk core errors

use souk_storage_traits::alerts::error::AlertError;
use souk_storage_traits::conversations::error::ConversationError;
use souk_storage_traits::messages::error::MessageError;
use souk_storage_traits::notifications::error::NotificationError;
use souk_storage_traits::{ConversationId, MessageId, UserId};

/// Souk error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Message body was empty after trimming
    #[error("message body is empty")]
    EmptyMessageBody,
    /// A conversation needs two distinct users
    #[error("cannot start a conversation with yourself")]
    SelfConversation,
    /// The acting user is not a participant of the conversation
    #[error("user {user} is not a participant of conversation {conversation}")]
    NotAParticipant {
        /// The acting user
        user: UserId,
        /// The conversation acted on
        conversation: ConversationId,
    },
    /// Conversation not found
    #[error("conversation not found")]
    ConversationNotFound,
    /// A price value failed validation
    #[error("invalid price: {0}")]
    InvalidPrice(String),
    /// The summary merge failed after the message itself was appended.
    ///
    /// The message exists in the log but the conversation still shows the
    /// previous tail. Not rolled back: the summary is a display and
    /// notification hint, never the source of truth for message content.
    #[error("conversation summary update failed after append of {message_id}: {source}")]
    SummaryWriteFailed {
        /// The message that was appended before the failure
        message_id: MessageId,
        /// The underlying storage failure
        source: ConversationError,
    },
    /// The notification write failed after the conversation was already
    /// flagged notified.
    ///
    /// The flag stays set, so the message will never produce a
    /// notification. Not rolled back: a missing notification is preferred
    /// over a duplicate one.
    #[error("notification write failed for conversation {conversation}: {source}")]
    NotificationWriteFailed {
        /// The conversation whose notified flag was flipped
        conversation: ConversationId,
        /// The underlying storage failure
        source: NotificationError,
    },
    /// Conversation storage error
    #[error(transparent)]
    Conversation(#[from] ConversationError),
    /// Message storage error
    #[error(transparent)]
    Message(#[from] MessageError),
    /// Notification storage error
    #[error(transparent)]
    Notification(#[from] NotificationError),
    /// Price-alert storage error
    #[error(transparent)]
    Alert(#[from] AlertError),
}
