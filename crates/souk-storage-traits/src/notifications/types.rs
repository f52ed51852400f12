//! Types for the notifications module

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ids::{ListingId, NotificationId, UserId};
use crate::timestamp::Timestamp;
use crate::ConversationId;

use super::error::NotificationError;

/// What kind of event a notification reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NotificationKind {
    /// A new chat message in a conversation the recipient participates in
    Message,
    /// A watched listing's price dropped to or below the recipient's target
    PriceAlert,
    /// Anything else (reserved for future producers)
    Other,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl NotificationKind {
    /// Get as `&str`
    pub fn as_str(&self) -> &str {
        match self {
            Self::Message => "message",
            Self::PriceAlert => "price_alert",
            Self::Other => "other",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = NotificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "message" => Ok(Self::Message),
            "price_alert" => Ok(Self::PriceAlert),
            "other" => Ok(Self::Other),
            _ => Err(NotificationError::InvalidParameters(format!(
                "Invalid notification kind: {}",
                s
            ))),
        }
    }
}

impl Serialize for NotificationKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NotificationKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A notification as submitted by a producer, before the backend assigns an
/// id and timestamp. Notifications start unread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    /// The user this notification is for
    pub recipient: UserId,
    /// What kind of event it reports
    pub kind: NotificationKind,
    /// The conversation it points at, for message notifications
    pub conversation_id: Option<ConversationId>,
    /// The listing it points at, for price alerts
    pub listing_id: Option<ListingId>,
    /// Human-readable summary line
    pub body: String,
}

/// A stored notification record.
///
/// Owned independently of the conversation that produced it; deleting or
/// changing the conversation never touches existing notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Server-assigned identifier
    pub id: NotificationId,
    /// The user this notification is for
    pub recipient: UserId,
    /// What kind of event it reports
    pub kind: NotificationKind,
    /// The conversation it points at, for message notifications
    pub conversation_id: Option<ConversationId>,
    /// The listing it points at, for price alerts
    pub listing_id: Option<ListingId>,
    /// Human-readable summary line
    pub body: String,
    /// Server-assigned creation timestamp
    pub created_at: Timestamp,
    /// True once the user has opened the referenced target
    pub read: bool,
}
