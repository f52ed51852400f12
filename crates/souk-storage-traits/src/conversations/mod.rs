//! Conversations module
//!
//! This module is responsible for storing and retrieving conversation
//! summary records: the participant pair, the listing snapshot, the
//! last-message tail and the read/notified state.
//!
//! Here we also define the storage traits that are used to store and
//! retrieve conversations.

use crate::ids::{ListingId, UserId};
use crate::subscription::Subscription;
use crate::timestamp::Timestamp;
use crate::ConversationId;

pub mod error;
pub mod types;

use self::error::ConversationError;
use self::types::*;

/// Storage traits for the conversations module
pub trait ConversationStorage {
    /// Save a conversation record.
    ///
    /// Creates the record if the id is new, otherwise replaces it whole.
    /// Subscribed feeds observe this as `Added` or `Modified` respectively.
    fn save_conversation(&self, conversation: Conversation) -> Result<(), ConversationError>;

    /// Find a conversation by id
    fn find_conversation_by_id(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, ConversationError>;

    /// Find a conversation by its participant pair and listing.
    ///
    /// The pair is matched unordered. This is the lookup path for records
    /// created before deterministic conversation ids existed.
    fn find_conversation_by_key(
        &self,
        user_a: &UserId,
        user_b: &UserId,
        listing: &ListingId,
    ) -> Result<Option<Conversation>, ConversationError>;

    /// All conversations `user` participates in, ordered by
    /// `last_message_at` descending
    fn conversations_for_user(&self, user: &UserId) -> Result<Vec<Conversation>, ConversationError>;

    /// Apply a field-level merge to a stored conversation.
    ///
    /// Unset patch fields are left untouched; set fields are replaced with
    /// last-writer-wins semantics. Fails with
    /// [`ConversationError::NotFound`] if the record does not exist.
    fn merge_conversation(
        &self,
        id: &ConversationId,
        patch: ConversationPatch,
    ) -> Result<(), ConversationError>;

    /// Idempotently add `user` to the conversation's read-by set.
    ///
    /// A second call with the same arguments is observably identical to the
    /// first: the set is unchanged and no further change event is emitted.
    fn add_read_participant(
        &self,
        id: &ConversationId,
        user: &UserId,
    ) -> Result<(), ConversationError>;

    /// Set `notified = true` if and only if the conversation's
    /// `last_message_at` still equals `expected_last_message_at` and the
    /// flag is currently false.
    ///
    /// Returns `Ok(true)` when this call performed the flip. Concurrent
    /// callers racing over the same message see exactly one `Ok(true)`;
    /// everyone else gets `Ok(false)`. This is the compare-and-swap that
    /// keeps notification emission at-most-once per message.
    fn mark_notified_if_current(
        &self,
        id: &ConversationId,
        expected_last_message_at: Timestamp,
    ) -> Result<bool, ConversationError>;

    /// Subscribe to every conversation `user` participates in.
    ///
    /// The feed starts with an `Added` replay of the current matching
    /// records (ordered `last_message_at` descending) and then delivers
    /// live change events in backend commit order. Dropping the handle
    /// cancels the subscription.
    fn subscribe_conversations_for_user(
        &self,
        user: &UserId,
    ) -> Result<Subscription<ConversationChange>, ConversationError>;
}

// Independent clients (one per device) share a single backend handle, so
// the traits are also implemented for Arc-wrapped providers.
impl<T> ConversationStorage for std::sync::Arc<T>
where
    T: ConversationStorage + ?Sized,
{
    fn save_conversation(&self, conversation: Conversation) -> Result<(), ConversationError> {
        self.as_ref().save_conversation(conversation)
    }

    fn find_conversation_by_id(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, ConversationError> {
        self.as_ref().find_conversation_by_id(id)
    }

    fn find_conversation_by_key(
        &self,
        user_a: &UserId,
        user_b: &UserId,
        listing: &ListingId,
    ) -> Result<Option<Conversation>, ConversationError> {
        self.as_ref().find_conversation_by_key(user_a, user_b, listing)
    }

    fn conversations_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<Conversation>, ConversationError> {
        self.as_ref().conversations_for_user(user)
    }

    fn merge_conversation(
        &self,
        id: &ConversationId,
        patch: ConversationPatch,
    ) -> Result<(), ConversationError> {
        self.as_ref().merge_conversation(id, patch)
    }

    fn add_read_participant(
        &self,
        id: &ConversationId,
        user: &UserId,
    ) -> Result<(), ConversationError> {
        self.as_ref().add_read_participant(id, user)
    }

    fn mark_notified_if_current(
        &self,
        id: &ConversationId,
        expected_last_message_at: Timestamp,
    ) -> Result<bool, ConversationError> {
        self.as_ref().mark_notified_if_current(id, expected_last_message_at)
    }

    fn subscribe_conversations_for_user(
        &self,
        user: &UserId,
    ) -> Result<Subscription<ConversationChange>, ConversationError> {
        self.as_ref().subscribe_conversations_for_user(user)
    }
}
