//! Notifications module
//!
//! This module is responsible for storing and retrieving notification
//! records. Notifications are produced by the chat reconciler and the
//! price-alert producer but stored and queried uniformly.

use crate::ids::{NotificationId, UserId};
use crate::subscription::Subscription;

pub mod error;
pub mod types;

use self::error::NotificationError;
use self::types::*;

/// Storage traits for the notifications module
pub trait NotificationStorage {
    /// Store a new notification.
    ///
    /// The backend assigns the id and creation timestamp; the record starts
    /// unread. Returns the stored record.
    fn save_notification(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, NotificationError>;

    /// All notifications for `user`, ordered by `created_at` descending
    fn notifications_for_user(&self, user: &UserId)
    -> Result<Vec<Notification>, NotificationError>;

    /// The unread notifications for `user`, ordered by `created_at`
    /// descending
    fn unread_notifications_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<Notification>, NotificationError>;

    /// Number of unread notifications for `user`
    fn unread_notification_count(&self, user: &UserId) -> Result<usize, NotificationError>;

    /// Idempotently mark a notification as read.
    ///
    /// A second call is observably identical to the first. Fails with
    /// [`NotificationError::NotFound`] if the record does not exist.
    fn mark_notification_read(&self, id: &NotificationId) -> Result<(), NotificationError>;

    /// Subscribe to `user`'s notifications.
    ///
    /// The feed replays the current unread notifications (newest first) and
    /// then delivers every subsequent creation or read-state change as the
    /// full record. Dropping the handle cancels the subscription.
    fn subscribe_notifications_for_user(
        &self,
        user: &UserId,
    ) -> Result<Subscription<Notification>, NotificationError>;
}

impl<T> NotificationStorage for std::sync::Arc<T>
where
    T: NotificationStorage + ?Sized,
{
    fn save_notification(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, NotificationError> {
        self.as_ref().save_notification(notification)
    }

    fn notifications_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<Notification>, NotificationError> {
        self.as_ref().notifications_for_user(user)
    }

    fn unread_notifications_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<Notification>, NotificationError> {
        self.as_ref().unread_notifications_for_user(user)
    }

    fn unread_notification_count(&self, user: &UserId) -> Result<usize, NotificationError> {
        self.as_ref().unread_notification_count(user)
    }

    fn mark_notification_read(&self, id: &NotificationId) -> Result<(), NotificationError> {
        self.as_ref().mark_notification_read(id)
    }

    fn subscribe_notifications_for_user(
        &self,
        user: &UserId,
    ) -> Result<Subscription<Notification>, NotificationError> {
        self.as_ref().subscribe_notifications_for_user(user)
    }
}
