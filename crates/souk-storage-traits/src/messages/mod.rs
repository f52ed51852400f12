//! Messages module
//!
//! This module is responsible for storing and retrieving the append-only
//! message log scoped to one conversation. The log is ordered by the
//! backend's server-assigned timestamps; appending never touches the
//! conversation summary record (that merge is the caller's half of the
//! composite send operation).

use crate::subscription::Subscription;
use crate::ConversationId;

pub mod error;
pub mod types;

use self::error::MessageError;
use self::types::*;

/// Storage traits for the messages module
pub trait MessageStorage {
    /// Append a message to a conversation's log.
    ///
    /// The backend assigns the id and a monotonic `sent_at` timestamp and
    /// returns the stored record so the caller can reuse the exact
    /// timestamp in the conversation summary merge. Fails with
    /// `InvalidParameters` if the conversation does not exist or the body
    /// is empty after trimming.
    fn append_message(
        &self,
        conversation_id: &ConversationId,
        message: NewChatMessage,
    ) -> Result<ChatMessage, MessageError>;

    /// The full log of a conversation, ascending by `sent_at`
    fn messages(&self, conversation_id: &ConversationId) -> Result<Vec<ChatMessage>, MessageError>;

    /// Subscribe to a conversation's message log.
    ///
    /// The feed replays the full history in log order and then delivers
    /// the live tail. Re-subscribing replays from the start again.
    /// Dropping the handle cancels the subscription.
    fn subscribe_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Subscription<ChatMessage>, MessageError>;
}

impl<T> MessageStorage for std::sync::Arc<T>
where
    T: MessageStorage + ?Sized,
{
    fn append_message(
        &self,
        conversation_id: &ConversationId,
        message: NewChatMessage,
    ) -> Result<ChatMessage, MessageError> {
        self.as_ref().append_message(conversation_id, message)
    }

    fn messages(&self, conversation_id: &ConversationId) -> Result<Vec<ChatMessage>, MessageError> {
        self.as_ref().messages(conversation_id)
    }

    fn subscribe_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Subscription<ChatMessage>, MessageError> {
        self.as_ref().subscribe_messages(conversation_id)
    }
}
