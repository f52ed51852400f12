//! Memory-based storage implementation for Souk.
//!
//! This module provides a memory-based storage implementation for the Souk
//! marketplace chat core. It implements the `SoukStorageProvider` trait,
//! allowing it to be used as an in-memory storage backend.
//!
//! Memory-based storage is non-persistent and will be cleared when the
//! application terminates. It's useful for testing or ephemeral applications
//! where persistence isn't required, and it doubles as the reference
//! implementation of the semantics remote backends must honour:
//!
//! - field-level merges with last-writer-wins semantics
//! - an idempotent set-union for read markers
//! - a compare-and-swap for the notified flag
//! - a strictly monotonic server clock, so no two writes share a timestamp
//! - subscriptions that replay current state and then deliver the live
//!   tail in commit order
//!
//! # Thread safety
//!
//! All state lives behind a single `parking_lot::RwLock`, allowing multiple
//! concurrent readers and exclusive writers. Change events are published
//! while the write lock is still held, which is what guarantees per-record
//! commit-order delivery to every subscriber.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

use std::collections::HashMap;
use std::fmt;

use parking_lot::{Mutex, RwLock};
use souk_storage_traits::alerts::types::PriceAlert;
use souk_storage_traits::conversations::types::{ChangeKind, Conversation, ConversationChange};
use souk_storage_traits::messages::types::ChatMessage;
use souk_storage_traits::notifications::types::Notification;
use souk_storage_traits::{
    AlertId, Backend, ConversationId, NotificationId, SoukStorageProvider, Timestamp, UserId,
};

mod alerts;
mod conversations;
mod messages;
mod notifications;

/// A memory-based storage implementation for Souk.
///
/// This struct implements the per-collection storage traits and the
/// combined [`SoukStorageProvider`] trait, providing unified in-memory
/// storage for conversations, messages, notifications and price alerts.
pub struct SoukMemoryStorage {
    inner: RwLock<SoukMemoryStorageInner>,
    clock: MonotonicClock,
}

struct SoukMemoryStorageInner {
    conversations: HashMap<ConversationId, Conversation>,
    // Per-conversation logs, kept in log order (sent_at ascending, id
    // tiebreak)
    messages: HashMap<ConversationId, Vec<ChatMessage>>,
    notifications: HashMap<NotificationId, Notification>,
    alerts: HashMap<AlertId, PriceAlert>,

    conversation_watchers: Vec<ConversationWatcher>,
    message_watchers: Vec<MessageWatcher>,
    notification_watchers: Vec<NotificationWatcher>,
}

struct ConversationWatcher {
    user: UserId,
    sender: flume::Sender<ConversationChange>,
}

struct MessageWatcher {
    conversation_id: ConversationId,
    sender: flume::Sender<ChatMessage>,
}

struct NotificationWatcher {
    user: UserId,
    sender: flume::Sender<Notification>,
}

/// The server-assigned timestamp source.
///
/// Wall-clock based but strictly monotonic: if two writes land within the
/// same millisecond (or the wall clock steps backwards) the second write
/// still gets a strictly larger value.
struct MonotonicClock {
    last: Mutex<u64>,
}

impl MonotonicClock {
    fn new() -> Self {
        Self { last: Mutex::new(0) }
    }

    fn now(&self) -> Timestamp {
        let mut last = self.last.lock();
        let wall = Timestamp::now().as_millis();
        let next = if wall > *last { wall } else { *last + 1 };
        *last = next;
        Timestamp::from_millis(next)
    }
}

impl fmt::Debug for SoukMemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoukMemoryStorage")
            .field("inner", &"RwLock<SoukMemoryStorageInner>")
            .finish()
    }
}

impl Default for SoukMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SoukMemoryStorage {
    /// Creates a new empty `SoukMemoryStorage`.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(SoukMemoryStorageInner {
                conversations: HashMap::new(),
                messages: HashMap::new(),
                notifications: HashMap::new(),
                alerts: HashMap::new(),
                conversation_watchers: Vec::new(),
                message_watchers: Vec::new(),
                notification_watchers: Vec::new(),
            }),
            clock: MonotonicClock::new(),
        }
    }

    fn next_timestamp(&self) -> Timestamp {
        self.clock.now()
    }
}

impl SoukMemoryStorageInner {
    /// Deliver a conversation change to every watcher whose user is a
    /// participant. Watchers with a dropped receiver are pruned on the way.
    fn publish_conversation(&mut self, conversation: &Conversation, kind: ChangeKind) {
        self.conversation_watchers.retain(|watcher| {
            if !conversation.has_participant(&watcher.user) {
                return !watcher.sender.is_disconnected();
            }
            watcher
                .sender
                .send(ConversationChange {
                    kind,
                    conversation: conversation.clone(),
                })
                .is_ok()
        });
    }

    /// Deliver an appended message to every watcher of its conversation.
    fn publish_message(&mut self, message: &ChatMessage) {
        self.message_watchers.retain(|watcher| {
            if watcher.conversation_id != message.conversation_id {
                return !watcher.sender.is_disconnected();
            }
            watcher.sender.send(message.clone()).is_ok()
        });
    }

    /// Deliver a notification record to every watcher of its recipient.
    fn publish_notification(&mut self, notification: &Notification) {
        self.notification_watchers.retain(|watcher| {
            if watcher.user != notification.recipient {
                return !watcher.sender.is_disconnected();
            }
            watcher.sender.send(notification.clone()).is_ok()
        });
    }
}

/// Implementation of `SoukStorageProvider` for memory-based storage.
impl SoukStorageProvider for SoukMemoryStorage {
    fn backend(&self) -> Backend {
        Backend::Memory
    }

    fn server_timestamp(&self) -> Timestamp {
        self.next_timestamp()
    }
}
