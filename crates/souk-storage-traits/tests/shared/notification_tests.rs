//! Notification and price-alert storage test functions

use souk_storage_traits::alerts::types::{NewPriceAlert, PriceAlertPatch};
use souk_storage_traits::alerts::PriceAlertStorage;
use souk_storage_traits::notifications::types::{NewNotification, NotificationKind};
use souk_storage_traits::notifications::NotificationStorage;
use souk_storage_traits::{ConversationId, ListingId};

use super::bob;

fn message_notification(body: &str) -> NewNotification {
    NewNotification {
        recipient: bob(),
        kind: NotificationKind::Message,
        conversation_id: Some(ConversationId::new("c-1")),
        listing_id: None,
        body: body.to_string(),
    }
}

/// Save, list newest-first, and idempotent read flip
pub fn test_notification_lifecycle<S>(storage: S)
where
    S: NotificationStorage,
{
    let first = storage.save_notification(message_notification("first")).unwrap();
    let second = storage.save_notification(message_notification("second")).unwrap();
    assert!(second.created_at > first.created_at);

    let listed = storage.notifications_for_user(&bob()).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].body, "second");

    assert_eq!(storage.unread_notification_count(&bob()).unwrap(), 2);

    storage.mark_notification_read(&first.id).unwrap();
    storage.mark_notification_read(&first.id).unwrap();
    assert_eq!(storage.unread_notification_count(&bob()).unwrap(), 1);

    let unread = storage.unread_notifications_for_user(&bob()).unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].body, "second");
}

/// Notification feeds replay unread state then tail live events
pub fn test_notification_feed<S>(storage: S)
where
    S: NotificationStorage,
{
    storage.save_notification(message_notification("before")).unwrap();

    let feed = storage.subscribe_notifications_for_user(&bob()).unwrap();
    let replay = feed.drain();
    assert_eq!(replay.len(), 1);
    assert_eq!(replay[0].body, "before");

    storage.save_notification(message_notification("after")).unwrap();
    let tail = feed.drain();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].body, "after");
}

/// Alert CRUD: save, list, merge-update, idempotent delete
pub fn test_alert_lifecycle<S>(storage: S)
where
    S: PriceAlertStorage,
{
    let listing = ListingId::new("post-1");
    let alert = storage
        .save_alert(NewPriceAlert {
            user: bob(),
            listing_id: listing.clone(),
            target_price: 250.0,
            current_price: 300.0,
        })
        .unwrap();

    assert_eq!(storage.alerts_for_user(&bob()).unwrap().len(), 1);
    assert_eq!(storage.alerts_for_listing(&listing).unwrap().len(), 1);

    let updated = storage
        .update_alert(
            &alert.id,
            PriceAlertPatch {
                target_price: None,
                current_price: Some(275.0),
            },
        )
        .unwrap();
    assert_eq!(updated.current_price, 275.0);
    assert_eq!(updated.target_price, 250.0);
    assert!(updated.updated_at > alert.updated_at);

    storage.delete_alert(&alert.id).unwrap();
    storage.delete_alert(&alert.id).unwrap();
    assert!(storage.alerts_for_user(&bob()).unwrap().is_empty());
}
