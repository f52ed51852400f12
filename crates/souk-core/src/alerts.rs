//! Price alerts
//!
//! A price alert is a user's standing request to hear about a listing
//! dropping to or below a target price. Alerts are evaluated when the
//! seller edits a listing's price: every alert on the listing gets its
//! observed price refreshed, and each alert whose target was crossed
//! downward produces one price-alert notification, unless the alert
//! belongs to the editor, who does not need to be told about their own
//! change.

use souk_storage_traits::alerts::types::{NewPriceAlert, PriceAlert, PriceAlertPatch};
use souk_storage_traits::notifications::types::{NewNotification, Notification, NotificationKind};
use souk_storage_traits::{AlertId, ListingId, SoukStorageProvider, UserId};

use crate::error::Error;
use crate::retry::with_backoff;
use crate::Souk;

fn validate_price(label: &str, price: f64) -> Result<(), Error> {
    if !price.is_finite() || price <= 0.0 {
        return Err(Error::InvalidPrice(format!(
            "{label} must be a positive number, got {price}"
        )));
    }
    Ok(())
}

impl<Storage> Souk<Storage>
where
    Storage: SoukStorageProvider,
{
    /// Create a price alert for `user` on a listing.
    ///
    /// `current_price` is the listing price the user saw when subscribing;
    /// it is kept up to date by [`Souk::process_price_change`].
    pub fn create_price_alert(
        &self,
        user: &UserId,
        listing_id: &ListingId,
        target_price: f64,
        current_price: f64,
    ) -> Result<PriceAlert, Error> {
        validate_price("target price", target_price)?;
        validate_price("current price", current_price)?;

        let alert = self.storage().save_alert(NewPriceAlert {
            user: user.clone(),
            listing_id: listing_id.clone(),
            target_price,
            current_price,
        })?;
        tracing::info!(
            alert = %alert.id,
            user = %user,
            listing = %listing_id,
            target = target_price,
            "price alert created"
        );
        Ok(alert)
    }

    /// Change an alert's target price, refreshing the observed price at the
    /// same time
    pub fn update_price_alert(
        &self,
        id: &AlertId,
        target_price: f64,
        current_price: f64,
    ) -> Result<PriceAlert, Error> {
        validate_price("target price", target_price)?;
        validate_price("current price", current_price)?;

        let alert = self.storage().update_alert(
            id,
            PriceAlertPatch {
                target_price: Some(target_price),
                current_price: Some(current_price),
            },
        )?;
        Ok(alert)
    }

    /// Delete a price alert. Deleting an absent alert is a no-op.
    pub fn delete_price_alert(&self, id: &AlertId) -> Result<(), Error> {
        self.storage().delete_alert(id)?;
        Ok(())
    }

    /// One-shot fetch of `user`'s alerts, newest first, retried on
    /// transient backend failures
    pub async fn price_alerts_for_user(&self, user: &UserId) -> Result<Vec<PriceAlert>, Error> {
        let alerts = with_backoff(
            &self.config.retry,
            || self.storage().alerts_for_user(user),
            |e| e.is_transient(),
        )
        .await?;
        Ok(alerts)
    }

    /// Evaluate a listing price change against every alert on the listing.
    ///
    /// Called by the listing-edit flow with the price before and after the
    /// edit. Each alert's observed price is refreshed; alerts whose target
    /// was crossed downward (`new <= target < old`) and whose owner is not
    /// `editor` produce one price-alert notification each. Returns the
    /// emitted notifications.
    ///
    /// A refresh or notification failure on one alert is logged and skipped
    /// so a single bad record cannot block the rest of the sweep.
    pub fn process_price_change(
        &self,
        listing_id: &ListingId,
        listing_title: &str,
        editor: &UserId,
        old_price: f64,
        new_price: f64,
    ) -> Result<Vec<Notification>, Error> {
        validate_price("new price", new_price)?;
        if old_price == new_price {
            return Ok(Vec::new());
        }

        let alerts = self.storage().alerts_for_listing(listing_id)?;
        let mut emitted = Vec::new();

        for alert in alerts {
            if let Err(error) = self.storage().update_alert(
                &alert.id,
                PriceAlertPatch {
                    target_price: None,
                    current_price: Some(new_price),
                },
            ) {
                tracing::warn!(alert = %alert.id, %error, "failed to refresh alert price");
                continue;
            }

            if !alert.is_crossed_by(old_price, new_price) {
                continue;
            }
            if alert.user == *editor {
                tracing::debug!(alert = %alert.id, "skipping alert owned by the editor");
                continue;
            }

            let body = format!(
                "Price alert: {} is now {} (your target: {})",
                listing_title, new_price, alert.target_price
            );
            match self.storage().save_notification(NewNotification {
                recipient: alert.user.clone(),
                kind: NotificationKind::PriceAlert,
                conversation_id: None,
                listing_id: Some(listing_id.clone()),
                body,
            }) {
                Ok(notification) => {
                    tracing::info!(
                        alert = %alert.id,
                        recipient = %alert.user,
                        listing = %listing_id,
                        "price-alert notification emitted"
                    );
                    emitted.push(notification);
                }
                Err(error) => {
                    tracing::warn!(alert = %alert.id, %error, "failed to store price-alert notification");
                }
            }
        }
        Ok(emitted)
    }
}

#[cfg(test)]
mod tests {
    use souk_storage_traits::alerts::PriceAlertStorage;
    use souk_storage_traits::notifications::NotificationStorage;

    use super::*;
    use crate::tests::create_test_souk;

    fn bob() -> UserId {
        UserId::new("bob@example.com")
    }

    fn seller() -> UserId {
        UserId::new("seller@example.com")
    }

    #[test]
    fn test_create_validates_prices() {
        let souk = create_test_souk();
        let listing = ListingId::new("post-1");

        for bad in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let result = souk.create_price_alert(&bob(), &listing, bad, 300.0);
            assert!(matches!(result, Err(Error::InvalidPrice(_))));
        }

        let alert = souk
            .create_price_alert(&bob(), &listing, 250.0, 300.0)
            .unwrap();
        assert_eq!(alert.target_price, 250.0);
        assert_eq!(alert.current_price, 300.0);
    }

    #[test]
    fn test_crossing_emits_notification_and_refreshes_price() {
        let souk = create_test_souk();
        let listing = ListingId::new("post-1");
        let alert = souk
            .create_price_alert(&bob(), &listing, 250.0, 300.0)
            .unwrap();

        let emitted = souk
            .process_price_change(&listing, "Mountain bike", &seller(), 300.0, 240.0)
            .unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].recipient, bob());
        assert_eq!(emitted[0].kind, NotificationKind::PriceAlert);
        assert_eq!(
            emitted[0].body,
            "Price alert: Mountain bike is now 240 (your target: 250)"
        );

        let refreshed = souk
            .storage()
            .alerts_for_listing(&listing)
            .unwrap()
            .into_iter()
            .find(|a| a.id == alert.id)
            .unwrap();
        assert_eq!(refreshed.current_price, 240.0);
    }

    #[test]
    fn test_no_notification_without_crossing() {
        let souk = create_test_souk();
        let listing = ListingId::new("post-1");
        souk.create_price_alert(&bob(), &listing, 250.0, 300.0)
            .unwrap();

        // Still above target
        let emitted = souk
            .process_price_change(&listing, "Mountain bike", &seller(), 300.0, 260.0)
            .unwrap();
        assert!(emitted.is_empty());

        // Crossing fires once...
        let emitted = souk
            .process_price_change(&listing, "Mountain bike", &seller(), 260.0, 240.0)
            .unwrap();
        assert_eq!(emitted.len(), 1);

        // ...and further drops below the already-crossed target stay quiet
        let emitted = souk
            .process_price_change(&listing, "Mountain bike", &seller(), 240.0, 230.0)
            .unwrap();
        assert!(emitted.is_empty());

        assert_eq!(souk.storage().unread_notification_count(&bob()).unwrap(), 1);
    }

    #[test]
    fn test_editor_owned_alerts_are_skipped() {
        let souk = create_test_souk();
        let listing = ListingId::new("post-1");
        souk.create_price_alert(&seller(), &listing, 250.0, 300.0)
            .unwrap();
        souk.create_price_alert(&bob(), &listing, 250.0, 300.0)
            .unwrap();

        let emitted = souk
            .process_price_change(&listing, "Mountain bike", &seller(), 300.0, 200.0)
            .unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].recipient, bob());

        // The editor's own alert still had its observed price refreshed
        let refreshed = souk.storage().alerts_for_listing(&listing).unwrap();
        assert!(refreshed.iter().all(|a| a.current_price == 200.0));
    }

    #[test]
    fn test_unchanged_price_is_a_no_op() {
        let souk = create_test_souk();
        let listing = ListingId::new("post-1");
        souk.create_price_alert(&bob(), &listing, 250.0, 300.0)
            .unwrap();

        let emitted = souk
            .process_price_change(&listing, "Mountain bike", &seller(), 300.0, 300.0)
            .unwrap();
        assert!(emitted.is_empty());

        let alerts = souk.storage().alerts_for_listing(&listing).unwrap();
        assert_eq!(alerts[0].current_price, 300.0);
    }

    #[tokio::test]
    async fn test_update_and_delete_alert() {
        let souk = create_test_souk();
        let listing = ListingId::new("post-1");
        let alert = souk
            .create_price_alert(&bob(), &listing, 250.0, 300.0)
            .unwrap();

        let updated = souk
            .update_price_alert(&alert.id, 220.0, 280.0)
            .unwrap();
        assert_eq!(updated.target_price, 220.0);
        assert_eq!(updated.current_price, 280.0);

        assert_eq!(souk.price_alerts_for_user(&bob()).await.unwrap().len(), 1);

        souk.delete_price_alert(&alert.id).unwrap();
        assert!(souk.price_alerts_for_user(&bob()).await.unwrap().is_empty());
    }
}
