//! Memory-based storage implementation of the ConversationStorage trait

use souk_storage_traits::conversations::error::ConversationError;
use souk_storage_traits::conversations::types::*;
use souk_storage_traits::conversations::ConversationStorage;
use souk_storage_traits::{ConversationId, ListingId, Subscription, Timestamp, UserId};

use crate::{ConversationWatcher, SoukMemoryStorage};

fn sort_newest_first(conversations: &mut [Conversation]) {
    conversations.sort_by(|a, b| {
        b.last_message_at
            .cmp(&a.last_message_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

impl ConversationStorage for SoukMemoryStorage {
    fn save_conversation(&self, conversation: Conversation) -> Result<(), ConversationError> {
        let [first, second] = &conversation.participants;
        if first == second {
            return Err(ConversationError::InvalidParameters(
                "participants must be two distinct users".to_string(),
            ));
        }

        let mut inner = self.inner.write();
        let kind = if inner.conversations.contains_key(&conversation.id) {
            ChangeKind::Modified
        } else {
            ChangeKind::Added
        };
        inner
            .conversations
            .insert(conversation.id.clone(), conversation.clone());
        inner.publish_conversation(&conversation, kind);
        Ok(())
    }

    fn find_conversation_by_id(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, ConversationError> {
        let inner = self.inner.read();
        Ok(inner.conversations.get(id).cloned())
    }

    fn find_conversation_by_key(
        &self,
        user_a: &UserId,
        user_b: &UserId,
        listing: &ListingId,
    ) -> Result<Option<Conversation>, ConversationError> {
        let inner = self.inner.read();
        Ok(inner
            .conversations
            .values()
            .find(|c| {
                c.listing_id == *listing
                    && c.has_participant(user_a)
                    && c.has_participant(user_b)
            })
            .cloned())
    }

    fn conversations_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<Conversation>, ConversationError> {
        let inner = self.inner.read();
        let mut conversations: Vec<Conversation> = inner
            .conversations
            .values()
            .filter(|c| c.has_participant(user))
            .cloned()
            .collect();
        sort_newest_first(&mut conversations);
        Ok(conversations)
    }

    fn merge_conversation(
        &self,
        id: &ConversationId,
        patch: ConversationPatch,
    ) -> Result<(), ConversationError> {
        let mut inner = self.inner.write();
        let conversation = inner
            .conversations
            .get_mut(id)
            .ok_or(ConversationError::NotFound)?;
        patch.apply_to(conversation);
        let updated = conversation.clone();
        inner.publish_conversation(&updated, ChangeKind::Modified);
        Ok(())
    }

    fn add_read_participant(
        &self,
        id: &ConversationId,
        user: &UserId,
    ) -> Result<(), ConversationError> {
        let mut inner = self.inner.write();
        let conversation = inner
            .conversations
            .get_mut(id)
            .ok_or(ConversationError::NotFound)?;

        // Union is a no-op when the user is already present; no change
        // event is emitted in that case, which is what makes repeated
        // mark-read calls observably idempotent.
        if !conversation.read_by.insert(user.clone()) {
            return Ok(());
        }
        let updated = conversation.clone();
        inner.publish_conversation(&updated, ChangeKind::Modified);
        Ok(())
    }

    fn mark_notified_if_current(
        &self,
        id: &ConversationId,
        expected_last_message_at: Timestamp,
    ) -> Result<bool, ConversationError> {
        let mut inner = self.inner.write();
        let conversation = inner
            .conversations
            .get_mut(id)
            .ok_or(ConversationError::NotFound)?;

        if conversation.notified || conversation.last_message_at != expected_last_message_at {
            return Ok(false);
        }
        conversation.notified = true;
        let updated = conversation.clone();
        inner.publish_conversation(&updated, ChangeKind::Modified);
        Ok(true)
    }

    fn subscribe_conversations_for_user(
        &self,
        user: &UserId,
    ) -> Result<Subscription<ConversationChange>, ConversationError> {
        let mut inner = self.inner.write();
        let (sender, receiver) = flume::unbounded();

        // Replay the current matching set before the watcher goes live so
        // no change can slip between snapshot and registration.
        let mut existing: Vec<Conversation> = inner
            .conversations
            .values()
            .filter(|c| c.has_participant(user))
            .cloned()
            .collect();
        sort_newest_first(&mut existing);
        for conversation in existing {
            let _ = sender.send(ConversationChange {
                kind: ChangeKind::Added,
                conversation,
            });
        }

        inner.conversation_watchers.push(ConversationWatcher {
            user: user.clone(),
            sender,
        });
        Ok(Subscription::new(receiver))
    }
}
