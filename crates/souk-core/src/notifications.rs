//! Notification queries and read-state updates
//!
//! Thin wrappers over notification storage: producers live in
//! [`crate::reconciler`] (messages) and [`crate::alerts`] (price alerts).

use souk_storage_traits::notifications::types::Notification;
use souk_storage_traits::{NotificationId, SoukStorageProvider, Subscription, UserId};

use crate::error::Error;
use crate::retry::with_backoff;
use crate::Souk;

impl<Storage> Souk<Storage>
where
    Storage: SoukStorageProvider,
{
    /// One-shot fetch of every notification for `user`, newest first,
    /// retried on transient backend failures
    pub async fn notifications_for_user(&self, user: &UserId) -> Result<Vec<Notification>, Error> {
        let notifications = with_backoff(
            &self.config.retry,
            || self.storage().notifications_for_user(user),
            |e| e.is_transient(),
        )
        .await?;
        Ok(notifications)
    }

    /// One-shot fetch of the unread notifications for `user`, newest first,
    /// retried on transient backend failures
    pub async fn unread_notifications(&self, user: &UserId) -> Result<Vec<Notification>, Error> {
        let notifications = with_backoff(
            &self.config.retry,
            || self.storage().unread_notifications_for_user(user),
            |e| e.is_transient(),
        )
        .await?;
        Ok(notifications)
    }

    /// Number of unread notifications for `user` (the bell badge)
    pub fn unread_notification_count(&self, user: &UserId) -> Result<usize, Error> {
        let count = self.storage().unread_notification_count(user)?;
        Ok(count)
    }

    /// Idempotently mark a notification as read, called when the user opens
    /// the referenced target
    pub fn mark_notification_read(&self, id: &NotificationId) -> Result<(), Error> {
        self.storage().mark_notification_read(id)?;
        Ok(())
    }

    /// Subscribe to `user`'s notifications: current unread replayed first,
    /// then every creation and read-state change
    pub fn subscribe_notifications(&self, user: &UserId) -> Result<Subscription<Notification>, Error> {
        let feed = self.storage().subscribe_notifications_for_user(user)?;
        Ok(feed)
    }
}
