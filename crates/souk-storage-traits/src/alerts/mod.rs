//! Price-alerts module
//!
//! This module is responsible for storing and retrieving price alerts:
//! a user's standing request to be notified when a listing's price drops
//! to or below a target value.

use crate::ids::{AlertId, ListingId, UserId};

pub mod error;
pub mod types;

use self::error::AlertError;
use self::types::*;

/// Storage traits for the price-alerts module
pub trait PriceAlertStorage {
    /// Store a new price alert.
    ///
    /// The backend assigns the id and timestamps. Returns the stored record.
    fn save_alert(&self, alert: NewPriceAlert) -> Result<PriceAlert, AlertError>;

    /// All alerts created by `user`, ordered by `created_at` descending
    fn alerts_for_user(&self, user: &UserId) -> Result<Vec<PriceAlert>, AlertError>;

    /// All alerts watching `listing`, in unspecified order
    fn alerts_for_listing(&self, listing: &ListingId) -> Result<Vec<PriceAlert>, AlertError>;

    /// Apply a field-level merge to a stored alert and bump `updated_at`.
    ///
    /// Fails with [`AlertError::NotFound`] if the record does not exist.
    fn update_alert(&self, id: &AlertId, patch: PriceAlertPatch) -> Result<PriceAlert, AlertError>;

    /// Delete an alert. Deleting an absent alert is a no-op.
    fn delete_alert(&self, id: &AlertId) -> Result<(), AlertError>;
}

impl<T> PriceAlertStorage for std::sync::Arc<T>
where
    T: PriceAlertStorage + ?Sized,
{
    fn save_alert(&self, alert: NewPriceAlert) -> Result<PriceAlert, AlertError> {
        self.as_ref().save_alert(alert)
    }

    fn alerts_for_user(&self, user: &UserId) -> Result<Vec<PriceAlert>, AlertError> {
        self.as_ref().alerts_for_user(user)
    }

    fn alerts_for_listing(&self, listing: &ListingId) -> Result<Vec<PriceAlert>, AlertError> {
        self.as_ref().alerts_for_listing(listing)
    }

    fn update_alert(&self, id: &AlertId, patch: PriceAlertPatch) -> Result<PriceAlert, AlertError> {
        self.as_ref().update_alert(id, patch)
    }

    fn delete_alert(&self, id: &AlertId) -> Result<(), AlertError> {
        self.as_ref().delete_alert(id)
    }
}
