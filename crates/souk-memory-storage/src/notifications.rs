//! Memory-based storage implementation of the NotificationStorage trait

use souk_storage_traits::notifications::error::NotificationError;
use souk_storage_traits::notifications::types::*;
use souk_storage_traits::notifications::NotificationStorage;
use souk_storage_traits::{NotificationId, Subscription, UserId};
use uuid::Uuid;

use crate::{NotificationWatcher, SoukMemoryStorage};

fn sort_newest_first(notifications: &mut [Notification]) {
    notifications.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

impl NotificationStorage for SoukMemoryStorage {
    fn save_notification(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, NotificationError> {
        let created_at = self.next_timestamp();

        let mut inner = self.inner.write();
        let stored = Notification {
            id: NotificationId::new(Uuid::new_v4().to_string()),
            recipient: notification.recipient,
            kind: notification.kind,
            conversation_id: notification.conversation_id,
            listing_id: notification.listing_id,
            body: notification.body,
            created_at,
            read: false,
        };
        inner
            .notifications
            .insert(stored.id.clone(), stored.clone());
        inner.publish_notification(&stored);
        tracing::debug!(
            recipient = %stored.recipient,
            kind = %stored.kind,
            notification = %stored.id,
            "notification stored"
        );
        Ok(stored)
    }

    fn notifications_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<Notification>, NotificationError> {
        let inner = self.inner.read();
        let mut notifications: Vec<Notification> = inner
            .notifications
            .values()
            .filter(|n| n.recipient == *user)
            .cloned()
            .collect();
        sort_newest_first(&mut notifications);
        Ok(notifications)
    }

    fn unread_notifications_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<Notification>, NotificationError> {
        let mut notifications = self.notifications_for_user(user)?;
        notifications.retain(|n| !n.read);
        Ok(notifications)
    }

    fn unread_notification_count(&self, user: &UserId) -> Result<usize, NotificationError> {
        let inner = self.inner.read();
        Ok(inner
            .notifications
            .values()
            .filter(|n| n.recipient == *user && !n.read)
            .count())
    }

    fn mark_notification_read(&self, id: &NotificationId) -> Result<(), NotificationError> {
        let mut inner = self.inner.write();
        let notification = inner
            .notifications
            .get_mut(id)
            .ok_or(NotificationError::NotFound)?;

        // Already read: nothing changes and no event goes out.
        if notification.read {
            return Ok(());
        }
        notification.read = true;
        let updated = notification.clone();
        inner.publish_notification(&updated);
        Ok(())
    }

    fn subscribe_notifications_for_user(
        &self,
        user: &UserId,
    ) -> Result<Subscription<Notification>, NotificationError> {
        let mut inner = self.inner.write();
        let (sender, receiver) = flume::unbounded();

        let mut unread: Vec<Notification> = inner
            .notifications
            .values()
            .filter(|n| n.recipient == *user && !n.read)
            .cloned()
            .collect();
        sort_newest_first(&mut unread);
        for notification in unread {
            let _ = sender.send(notification);
        }

        inner.notification_watchers.push(NotificationWatcher {
            user: user.clone(),
            sender,
        });
        Ok(Subscription::new(receiver))
    }
}
