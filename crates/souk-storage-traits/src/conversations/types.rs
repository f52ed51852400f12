//! Types for the conversations module

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ids::{ListingId, UserId};
use crate::timestamp::Timestamp;
use crate::ConversationId;

use super::error::ConversationError;

/// Denormalized snapshot of the listing a conversation is about.
///
/// Captured once when the conversation is created and intentionally never
/// refreshed afterwards: the chat header keeps showing the title and price
/// the buyer saw when they first got in touch, even if the listing changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingSummary {
    /// Listing title at creation time
    pub title: String,
    /// Main listing image URL, if any
    pub image_url: Option<String>,
    /// Listing price at creation time
    pub price: f64,
}

/// A conversation between two users about one listing.
///
/// This is the summary/control record: the message bodies live in the
/// per-conversation log (see [`crate::messages`]), while this record tracks
/// the participant pair, the tail of the log and the read/notified state
/// that drives unread badges and notification emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Stable identifier, assigned at creation
    pub id: ConversationId,
    /// The two participants, initiator first.
    ///
    /// The pair is matched unordered everywhere; the stored order only
    /// records who made first contact.
    pub participants: [UserId; 2],
    /// The listing under discussion; immutable after creation
    pub listing_id: ListingId,
    /// Snapshot of the listing at creation time
    pub listing: ListingSummary,
    /// Body of the most recent message, if any message was sent yet
    pub last_message_text: Option<String>,
    /// Sender of the most recent message
    pub last_message_sender: Option<UserId>,
    /// Server timestamp of the most recent message (creation time while the
    /// log is still empty)
    pub last_message_at: Timestamp,
    /// Users who have acknowledged the current last message.
    ///
    /// Immediately after an append this is exactly `{sender}`; it grows only
    /// when a participant opens the conversation.
    pub read_by: BTreeSet<UserId>,
    /// True once a notification has been emitted for the current
    /// `last_message_at`; reset to false by every append
    pub notified: bool,
    /// When the conversation record was created
    pub created_at: Timestamp,
}

impl Conversation {
    /// Whether `user` is one of the two participants
    pub fn has_participant(&self, user: &UserId) -> bool {
        self.participants.iter().any(|p| p == user)
    }

    /// The participant other than `user`, if `user` is a participant
    pub fn other_participant(&self, user: &UserId) -> Option<&UserId> {
        if !self.has_participant(user) {
            return None;
        }
        self.participants.iter().find(|p| *p != user)
    }

    /// Whether the conversation shows as unread for `user`.
    ///
    /// A conversation is unread when the last message exists, was sent by
    /// someone else and `user` has not yet acknowledged it.
    pub fn is_unread_for(&self, user: &UserId) -> bool {
        self.last_message_sender
            .as_ref()
            .is_some_and(|sender| sender != user)
            && !self.read_by.contains(user)
    }
}

/// A field-level merge applied to a stored conversation.
///
/// Only `Some` fields are written; everything else is left untouched. This
/// mirrors the partial-update primitive of the backend document store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationPatch {
    /// Replace the last-message body
    pub last_message_text: Option<String>,
    /// Replace the last-message sender
    pub last_message_sender: Option<UserId>,
    /// Replace the last-message timestamp
    pub last_message_at: Option<Timestamp>,
    /// Replace the read-by set (not a union; see
    /// [`super::ConversationStorage::add_read_participant`] for the union)
    pub read_by: Option<BTreeSet<UserId>>,
    /// Replace the notified flag
    pub notified: Option<bool>,
}

impl ConversationPatch {
    /// The summary merge every append performs by convention: new tail
    /// fields, read-by collapsed to the sender alone, notification re-armed.
    pub fn message_sent(body: impl Into<String>, sender: UserId, at: Timestamp) -> Self {
        let read_by = BTreeSet::from([sender.clone()]);
        Self {
            last_message_text: Some(body.into()),
            last_message_sender: Some(sender),
            last_message_at: Some(at),
            read_by: Some(read_by),
            notified: Some(false),
        }
    }

    /// Apply the patch to a conversation in place
    pub fn apply_to(&self, conversation: &mut Conversation) {
        if let Some(text) = &self.last_message_text {
            conversation.last_message_text = Some(text.clone());
        }
        if let Some(sender) = &self.last_message_sender {
            conversation.last_message_sender = Some(sender.clone());
        }
        if let Some(at) = self.last_message_at {
            conversation.last_message_at = at;
        }
        if let Some(read_by) = &self.read_by {
            conversation.read_by = read_by.clone();
        }
        if let Some(notified) = self.notified {
            conversation.notified = notified;
        }
    }
}

/// Classification of a change event delivered by a conversation feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangeKind {
    /// The record entered the subscribed set (including the initial replay)
    Added,
    /// An already-delivered record was modified
    Modified,
    /// The record left the subscribed set
    Removed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ChangeKind {
    /// Get as `&str`
    pub fn as_str(&self) -> &str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

impl FromStr for ChangeKind {
    type Err = ConversationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "added" => Ok(Self::Added),
            "modified" => Ok(Self::Modified),
            "removed" => Ok(Self::Removed),
            _ => Err(ConversationError::InvalidParameters(format!(
                "Invalid change kind: {}",
                s
            ))),
        }
    }
}

impl Serialize for ChangeKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ChangeKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// One change event on a conversation feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationChange {
    /// How the record changed relative to the subscribed set
    pub kind: ChangeKind,
    /// The record after the change
    pub conversation: Conversation,
}
