//! Souk Public Prelude
//!
//! This module provides the essential types that Souk users need to work
//! with the library. It only includes the core Souk types and storage
//! traits; bring your own storage backend (e.g. `souk-memory-storage`).
//!
//! ## Usage
//!
//! ```rust
//! use souk_core::prelude::*;
//! use souk_memory_storage::SoukMemoryStorage;
//!
//! let souk = Souk::new(SoukMemoryStorage::default());
//! ```

// === Core Souk Types ===
/// Souk error type
pub use crate::Error;
/// The main Souk struct for marketplace chat operations
pub use crate::Souk;
/// Configuration for core behavior
pub use crate::SoukConfig;

// === Operation helpers ===
/// Sender display snapshot attached to outgoing messages
pub use crate::conversations::SenderProfile;
/// Reconciler state machine
pub use crate::reconciler::{classify, ConversationState};
/// Retry policy for one-shot reads
pub use crate::retry::RetryPolicy;
/// Client-side unread aggregation
pub use crate::unread::{is_unread, unread_conversation_count};

// === Storage Traits (users need these to provide storage implementations) ===
pub use souk_storage_traits::{Backend, SoukStorageProvider, Subscription};

// === Identifiers and timestamps ===
pub use souk_storage_traits::{
    AlertId, ConversationId, ListingId, MessageId, NotificationId, Timestamp, UserId,
};

// === Storage Type Aliases (convenient for users working with storage) ===
pub use souk_storage_traits::alerts::types as alert_types;
pub use souk_storage_traits::conversations::types as conversation_types;
pub use souk_storage_traits::messages::types as message_types;
pub use souk_storage_traits::notifications::types as notification_types;
