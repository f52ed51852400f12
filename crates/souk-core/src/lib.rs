//! Client core for the Souk marketplace chat and notification subsystem.
//!
//! This crate provides the logic that keeps a conversation record, its
//! message log, per-user read state and derived notifications consistent
//! while two independent clients write concurrently: sending updates the
//! summary by convention, every recipient's reconciler races over a
//! compare-and-swap to emit at most one notification per message, and
//! opening a conversation re-arms the cycle by acknowledging the current
//! last message.
//!
//! All persistence goes through a [`SoukStorageProvider`] injected at
//! construction time, so the same core runs against the remote document
//! store in production and against `souk-memory-storage` in tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

use souk_storage_traits::SoukStorageProvider;

pub mod alerts;
pub mod conversations;
pub mod error;
pub mod logging;
pub mod notifications;
pub mod prelude;
pub mod reconciler;
pub mod retry;
pub mod unread;

pub use self::error::Error;
use self::retry::RetryPolicy;

// Re-exports for convenience
pub use souk_storage_traits::{ConversationId, ListingId, UserId};

/// Configuration for Souk behavior
///
/// All fields have defaults that fit a typical mobile client.
///
/// # Examples
///
/// ```rust
/// use souk_core::SoukConfig;
///
/// // Use defaults (recommended for most cases)
/// let config = SoukConfig::default();
///
/// // Custom configuration
/// let config = SoukConfig {
///     notification_preview_len: 40,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct SoukConfig {
    /// Maximum number of characters of the message body quoted in a
    /// notification. Longer bodies are cut at a character boundary and
    /// suffixed with an ellipsis.
    ///
    /// Default: 80
    pub notification_preview_len: usize,

    /// Backoff policy applied to one-shot reads when the backend reports a
    /// transient failure. Writes are never retried: an abandoned write is
    /// surfaced to the caller instead, so a slow backend cannot make the
    /// client double-send.
    ///
    /// Default: 4 attempts, 200 ms base delay, 5 s cap
    pub retry: RetryPolicy,
}

impl Default for SoukConfig {
    fn default() -> Self {
        Self {
            notification_preview_len: 80,
            retry: RetryPolicy::default(),
        }
    }
}

impl SoukConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }
}

/// Builder for constructing Souk instances
///
/// # Examples
///
/// ```no_run
/// use souk_core::{Souk, SoukConfig};
/// use souk_memory_storage::SoukMemoryStorage;
///
/// // Simple usage with defaults
/// let souk = Souk::new(SoukMemoryStorage::default());
///
/// // With custom configuration
/// let souk = Souk::builder(SoukMemoryStorage::default())
///     .with_config(SoukConfig::new())
///     .build();
/// ```
#[derive(Debug)]
pub struct SoukBuilder<Storage> {
    storage: Storage,
    config: SoukConfig,
}

impl<Storage> SoukBuilder<Storage>
where
    Storage: SoukStorageProvider,
{
    /// Create a new Souk builder with the given storage
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            config: SoukConfig::default(),
        }
    }

    /// Set a custom configuration
    pub fn with_config(mut self, config: SoukConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the Souk instance with the configured settings
    pub fn build(self) -> Souk<Storage> {
        Souk {
            storage: self.storage,
            config: self.config,
        }
    }
}

/// The main struct for the Souk client core.
///
/// One instance represents one user's device-local client. Independent
/// instances sharing a backend model independent devices; nothing in this
/// struct is shared between them except what the storage provider stores.
///
/// It uses a generic storage provider that implements the
/// [`SoukStorageProvider`] trait, allowing for flexible storage backends.
#[derive(Debug)]
pub struct Souk<Storage>
where
    Storage: SoukStorageProvider,
{
    storage: Storage,
    /// Configuration for core behavior
    pub config: SoukConfig,
}

impl<Storage> Souk<Storage>
where
    Storage: SoukStorageProvider,
{
    /// Create a builder for constructing a Souk instance
    pub fn builder(storage: Storage) -> SoukBuilder<Storage> {
        SoukBuilder::new(storage)
    }

    /// Construct a new Souk instance with default configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use souk_core::Souk;
    /// # use souk_memory_storage::SoukMemoryStorage;
    /// let souk = Souk::new(SoukMemoryStorage::default());
    /// ```
    pub fn new(storage: Storage) -> Self {
        Self::builder(storage).build()
    }

    /// Get the storage provider
    pub(crate) fn storage(&self) -> &Storage {
        &self.storage
    }
}
