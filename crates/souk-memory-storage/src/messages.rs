//! Memory-based storage implementation of the MessageStorage trait

use souk_storage_traits::messages::error::MessageError;
use souk_storage_traits::messages::types::*;
use souk_storage_traits::messages::MessageStorage;
use souk_storage_traits::{ConversationId, MessageId, Subscription};
use uuid::Uuid;

use crate::{MessageWatcher, SoukMemoryStorage};

impl MessageStorage for SoukMemoryStorage {
    fn append_message(
        &self,
        conversation_id: &ConversationId,
        message: NewChatMessage,
    ) -> Result<ChatMessage, MessageError> {
        if message.body.trim().is_empty() {
            return Err(MessageError::InvalidParameters(
                "message body is empty".to_string(),
            ));
        }

        let mut inner = self.inner.write();
        if !inner.conversations.contains_key(conversation_id) {
            return Err(MessageError::InvalidParameters(
                "conversation not found".to_string(),
            ));
        }

        // Stamped under the write lock so commit order and timestamp order
        // agree within the log.
        let sent_at = self.next_timestamp();

        let stored = ChatMessage {
            id: MessageId::new(Uuid::new_v4().to_string()),
            conversation_id: conversation_id.clone(),
            sender: message.sender,
            sender_name: message.sender_name,
            sender_avatar: message.sender_avatar,
            body: message.body,
            sent_at,
        };

        let log = inner.messages.entry(conversation_id.clone()).or_default();
        // The clock guarantees strictly increasing sent_at, so appending
        // keeps the log ordered.
        log.push(stored.clone());

        inner.publish_message(&stored);
        tracing::debug!(
            conversation = %conversation_id,
            message = %stored.id,
            "message appended"
        );
        Ok(stored)
    }

    fn messages(&self, conversation_id: &ConversationId) -> Result<Vec<ChatMessage>, MessageError> {
        let inner = self.inner.read();
        Ok(inner
            .messages
            .get(conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    fn subscribe_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Subscription<ChatMessage>, MessageError> {
        let mut inner = self.inner.write();
        let (sender, receiver) = flume::unbounded();

        if let Some(log) = inner.messages.get(conversation_id) {
            for message in log {
                let _ = sender.send(message.clone());
            }
        }

        inner.message_watchers.push(MessageWatcher {
            conversation_id: conversation_id.clone(),
            sender,
        });
        Ok(Subscription::new(receiver))
    }
}
