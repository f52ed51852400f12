//! Memory-based storage implementation of the PriceAlertStorage trait

use souk_storage_traits::alerts::error::AlertError;
use souk_storage_traits::alerts::types::*;
use souk_storage_traits::alerts::PriceAlertStorage;
use souk_storage_traits::{AlertId, ListingId, UserId};
use uuid::Uuid;

use crate::SoukMemoryStorage;

impl PriceAlertStorage for SoukMemoryStorage {
    fn save_alert(&self, alert: NewPriceAlert) -> Result<PriceAlert, AlertError> {
        let created_at = self.next_timestamp();

        let mut inner = self.inner.write();
        let stored = PriceAlert {
            id: AlertId::new(Uuid::new_v4().to_string()),
            user: alert.user,
            listing_id: alert.listing_id,
            target_price: alert.target_price,
            current_price: alert.current_price,
            created_at,
            updated_at: created_at,
        };
        inner.alerts.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    fn alerts_for_user(&self, user: &UserId) -> Result<Vec<PriceAlert>, AlertError> {
        let inner = self.inner.read();
        let mut alerts: Vec<PriceAlert> = inner
            .alerts
            .values()
            .filter(|a| a.user == *user)
            .cloned()
            .collect();
        alerts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(alerts)
    }

    fn alerts_for_listing(&self, listing: &ListingId) -> Result<Vec<PriceAlert>, AlertError> {
        let inner = self.inner.read();
        Ok(inner
            .alerts
            .values()
            .filter(|a| a.listing_id == *listing)
            .cloned()
            .collect())
    }

    fn update_alert(&self, id: &AlertId, patch: PriceAlertPatch) -> Result<PriceAlert, AlertError> {
        let updated_at = self.next_timestamp();

        let mut inner = self.inner.write();
        let alert = inner.alerts.get_mut(id).ok_or(AlertError::NotFound)?;
        if let Some(target) = patch.target_price {
            alert.target_price = target;
        }
        if let Some(current) = patch.current_price {
            alert.current_price = current;
        }
        alert.updated_at = updated_at;
        Ok(alert.clone())
    }

    fn delete_alert(&self, id: &AlertId) -> Result<(), AlertError> {
        let mut inner = self.inner.write();
        inner.alerts.remove(id);
        Ok(())
    }
}
