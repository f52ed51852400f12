//! Conversation identifiers

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ids::{ListingId, UserId};

/// Identifier of a conversation record.
///
/// New conversations use a deterministic id derived from the participant
/// pair and the listing under discussion (see [`ConversationId::derive`]),
/// which makes concurrent lookup-or-create races collapse onto the same
/// record instead of producing duplicates. Ids read back from a store that
/// predates this scheme are carried verbatim, so the type also accepts
/// arbitrary opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Create from an existing opaque identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the deterministic id for a participant pair and listing.
    ///
    /// The participants are sorted before hashing, so argument order does
    /// not matter: `derive(a, b, l) == derive(b, a, l)`.
    pub fn derive(user_a: &UserId, user_b: &UserId, listing: &ListingId) -> Self {
        let (first, second) = if user_a <= user_b {
            (user_a, user_b)
        } else {
            (user_b, user_a)
        };

        let mut hasher = Sha256::new();
        hasher.update(first.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(second.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(listing.as_str().as_bytes());

        Self(hex::encode(hasher.finalize()))
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ConversationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
