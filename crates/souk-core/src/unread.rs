//! Client-side unread aggregation
//!
//! Pure derived state over a conversation snapshot: nothing here reads or
//! writes storage. The badge UI recomputes these on every snapshot
//! delivered by the conversation feed.

use souk_storage_traits::conversations::types::Conversation;
use souk_storage_traits::UserId;

/// Whether a single conversation shows as unread for `user`
pub fn is_unread(conversation: &Conversation, user: &UserId) -> bool {
    conversation.is_unread_for(user)
}

/// Number of conversations in the snapshot that show as unread for `user`:
/// those whose last message exists, was sent by someone else and is not yet
/// acknowledged by `user`.
pub fn unread_conversation_count<'a>(
    conversations: impl IntoIterator<Item = &'a Conversation>,
    user: &UserId,
) -> usize {
    conversations
        .into_iter()
        .filter(|c| c.is_unread_for(user))
        .count()
}
