//! Conversation operations
//!
//! Lookup-or-create, the composite send operation (append + summary merge),
//! read markers and conversation feeds.
//!
//! Sending is deliberately not atomic: the message append and the summary
//! merge are two independent writes against the backend. A crash between
//! them leaves a message without a matching summary, which the surrounding
//! code treats as acceptable because the summary is only a display and
//! notification hint.

use std::collections::BTreeSet;

use souk_storage_traits::conversations::types::{
    Conversation, ConversationChange, ConversationPatch, ListingSummary,
};
use souk_storage_traits::messages::types::{ChatMessage, NewChatMessage};
use souk_storage_traits::{
    ConversationId, ListingId, SoukStorageProvider, Subscription, UserId,
};

use crate::error::Error;
use crate::retry::with_backoff;
use crate::Souk;

// Internal Result type alias for this module
pub(crate) type Result<T> = std::result::Result<T, Error>;

/// Snapshot of the sender's display profile attached to an outgoing message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderProfile {
    /// Display name at send time
    pub name: Option<String>,
    /// Avatar URL at send time
    pub avatar_url: Option<String>,
}

impl<Storage> Souk<Storage>
where
    Storage: SoukStorageProvider,
{
    /// Find the conversation between two users about a listing, creating it
    /// on first contact.
    ///
    /// Lookup goes by the deterministic id first, then by the
    /// participant-pair + listing query for records that predate
    /// deterministic ids. A newly created conversation starts with the
    /// initiator as the sole acknowledged reader and notification re-armed.
    ///
    /// Concurrent calls for the same pair and listing collapse onto the
    /// same record because the id is deterministic; the last writer's
    /// create simply overwrites an identical fresh record.
    pub fn find_or_create_conversation(
        &self,
        initiator: &UserId,
        peer: &UserId,
        listing_id: &ListingId,
        listing: ListingSummary,
    ) -> Result<Conversation> {
        if initiator == peer {
            return Err(Error::SelfConversation);
        }

        let id = ConversationId::derive(initiator, peer, listing_id);
        if let Some(existing) = self.storage().find_conversation_by_id(&id)? {
            return Ok(existing);
        }
        if let Some(existing) =
            self.storage()
                .find_conversation_by_key(initiator, peer, listing_id)?
        {
            return Ok(existing);
        }

        let now = self.storage().server_timestamp();
        let conversation = Conversation {
            id: id.clone(),
            participants: [initiator.clone(), peer.clone()],
            listing_id: listing_id.clone(),
            listing,
            last_message_text: None,
            last_message_sender: None,
            last_message_at: now,
            read_by: BTreeSet::from([initiator.clone()]),
            notified: false,
            created_at: now,
        };
        self.storage().save_conversation(conversation.clone())?;
        tracing::info!(
            conversation = %id,
            initiator = %initiator,
            listing = %listing_id,
            "conversation created"
        );
        Ok(conversation)
    }

    /// Send a message without a profile snapshot.
    ///
    /// See [`Souk::send_message_with_profile`].
    pub fn send_message(
        &self,
        conversation_id: &ConversationId,
        sender: &UserId,
        body: &str,
    ) -> Result<ChatMessage> {
        self.send_message_with_profile(conversation_id, sender, SenderProfile::default(), body)
    }

    /// Send a message: append to the log, then merge the summary.
    ///
    /// The body is trimmed before storage and must be non-empty afterwards.
    /// On success the conversation summary shows the new tail, `read_by`
    /// collapses to `{sender}` and `notified` is re-armed.
    ///
    /// When the append succeeds but the summary merge fails, the message is
    /// kept and [`Error::SummaryWriteFailed`] is returned; the recipients'
    /// clients will see the message in the log but unread badges will lag
    /// until the next successful send.
    pub fn send_message_with_profile(
        &self,
        conversation_id: &ConversationId,
        sender: &UserId,
        profile: SenderProfile,
        body: &str,
    ) -> Result<ChatMessage> {
        let body = body.trim();
        if body.is_empty() {
            return Err(Error::EmptyMessageBody);
        }

        let conversation = self
            .storage()
            .find_conversation_by_id(conversation_id)?
            .ok_or(Error::ConversationNotFound)?;
        if !conversation.has_participant(sender) {
            return Err(Error::NotAParticipant {
                user: sender.clone(),
                conversation: conversation_id.clone(),
            });
        }

        let message = self.storage().append_message(
            conversation_id,
            NewChatMessage {
                sender: sender.clone(),
                sender_name: profile.name,
                sender_avatar: profile.avatar_url,
                body: body.to_string(),
            },
        )?;

        let patch = ConversationPatch::message_sent(body, sender.clone(), message.sent_at);
        if let Err(source) = self.storage().merge_conversation(conversation_id, patch) {
            tracing::warn!(
                conversation = %conversation_id,
                message = %message.id,
                %source,
                "summary merge failed after append; leaving stale summary"
            );
            return Err(Error::SummaryWriteFailed {
                message_id: message.id,
                source,
            });
        }

        tracing::debug!(
            conversation = %conversation_id,
            message = %message.id,
            sender = %sender,
            "message sent"
        );
        Ok(message)
    }

    /// Idempotently record that `user` has seen the conversation's current
    /// last message.
    ///
    /// Calling this twice yields the same `read_by` set as calling it once.
    pub fn mark_conversation_read(
        &self,
        conversation_id: &ConversationId,
        user: &UserId,
    ) -> Result<()> {
        let conversation = self
            .storage()
            .find_conversation_by_id(conversation_id)?
            .ok_or(Error::ConversationNotFound)?;
        if !conversation.has_participant(user) {
            return Err(Error::NotAParticipant {
                user: user.clone(),
                conversation: conversation_id.clone(),
            });
        }
        self.storage().add_read_participant(conversation_id, user)?;
        Ok(())
    }

    /// Open a conversation for reading: acknowledge the current last
    /// message, then return the live message feed (full history replay
    /// followed by the tail).
    ///
    /// The returned handle must be dropped when the view goes away,
    /// otherwise the backend keeps delivering into a feed nobody reads.
    pub fn open_conversation(
        &self,
        conversation_id: &ConversationId,
        user: &UserId,
    ) -> Result<Subscription<ChatMessage>> {
        self.mark_conversation_read(conversation_id, user)?;
        let feed = self.storage().subscribe_messages(conversation_id)?;
        Ok(feed)
    }

    /// One-shot fetch of a conversation, retried on transient backend
    /// failures per the configured policy
    pub async fn conversation(&self, id: &ConversationId) -> Result<Option<Conversation>> {
        let found = with_backoff(
            &self.config.retry,
            || self.storage().find_conversation_by_id(id),
            |e| e.is_transient(),
        )
        .await?;
        Ok(found)
    }

    /// One-shot snapshot of all conversations `user` participates in,
    /// newest tail first, retried on transient backend failures
    pub async fn conversations_for_user(&self, user: &UserId) -> Result<Vec<Conversation>> {
        let conversations = with_backoff(
            &self.config.retry,
            || self.storage().conversations_for_user(user),
            |e| e.is_transient(),
        )
        .await?;
        Ok(conversations)
    }

    /// One-shot fetch of a conversation's full message log, retried on
    /// transient backend failures
    pub async fn messages(&self, conversation_id: &ConversationId) -> Result<Vec<ChatMessage>> {
        let messages = with_backoff(
            &self.config.retry,
            || self.storage().messages(conversation_id),
            |e| e.is_transient(),
        )
        .await?;
        Ok(messages)
    }

    /// Subscribe to every conversation `user` participates in.
    ///
    /// This is the feed that drives the conversation-list UI, the unread
    /// aggregator and the reconciler.
    pub fn subscribe_conversations(
        &self,
        user: &UserId,
    ) -> Result<Subscription<ConversationChange>> {
        let feed = self.storage().subscribe_conversations_for_user(user)?;
        Ok(feed)
    }
}
