//! Souk storage - storage provider traits and record types for the Souk
//! marketplace chat and notification core.
//!
//! The backend document store is treated as a black box behind typed
//! per-collection traits. Implementations only need to honour the merge,
//! ordering and subscription semantics documented on each trait method;
//! everything else (query engine, transport, caching) is their own business.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

pub mod alerts;
pub mod conversation_id;
pub mod conversations;
pub mod ids;
pub mod messages;
pub mod notifications;
pub mod subscription;
pub mod timestamp;

// Re-exports for convenience
pub use conversation_id::ConversationId;
pub use ids::{AlertId, ListingId, MessageId, NotificationId, UserId};
pub use subscription::Subscription;
pub use timestamp::Timestamp;

use self::alerts::PriceAlertStorage;
use self::conversations::ConversationStorage;
use self::messages::MessageStorage;
use self::notifications::NotificationStorage;

/// Backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// In-memory store, cleared when the process exits
    Memory,
    /// Remote document store reached over the network
    Remote,
}

impl Backend {
    /// Check if it's a persistent backend
    ///
    /// All values different from [`Backend::Memory`] are considered persistent
    pub fn is_persistent(&self) -> bool {
        !matches!(self, Self::Memory)
    }
}

/// Storage provider for Souk.
///
/// This trait combines the per-collection storage requirements into one
/// backend handle that the core takes by value and owns. The provider is the
/// single shared mutable resource between independent clients: a sender's
/// summary merge, a recipient's notified-flag flip and a participant's
/// read-marker union may all land on the same conversation record
/// concurrently. No locking is required of callers; writes are field-level
/// merges with last-writer-wins semantics except where a method documents
/// compare-and-swap behaviour.
///
/// Implementors must provide:
/// - Conversation storage for the summary/control records
/// - Message storage for the append-only per-conversation log
/// - Notification storage for derived notification records
/// - Price-alert storage for alert subscriptions
pub trait SoukStorageProvider:
    ConversationStorage + MessageStorage + NotificationStorage + PriceAlertStorage
{
    /// Returns the backend type.
    fn backend(&self) -> Backend;

    /// Returns the backend's current server-assigned timestamp.
    ///
    /// Successive calls observed by one client are strictly monotonic; this
    /// is the same sentinel the backend stamps onto appended messages and
    /// created records, so values from this method are directly comparable
    /// to stored `sent_at`/`created_at` fields.
    fn server_timestamp(&self) -> Timestamp;
}

// Independent clients (one per device) share a single backend handle, so
// the provider is also implemented for Arc-wrapped providers.
impl<T> SoukStorageProvider for std::sync::Arc<T>
where
    T: SoukStorageProvider + ?Sized,
{
    fn backend(&self) -> Backend {
        self.as_ref().backend()
    }

    fn server_timestamp(&self) -> Timestamp {
        self.as_ref().server_timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_is_persistent() {
        assert!(!Backend::Memory.is_persistent());
        assert!(Backend::Remote.is_persistent());
    }
}
