//! Types for the price-alerts module

use serde::{Deserialize, Serialize};

use crate::ids::{AlertId, ListingId, UserId};
use crate::timestamp::Timestamp;

/// A price alert as submitted by a user, before the backend assigns an id
/// and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPriceAlert {
    /// The user who wants to be alerted
    pub user: UserId,
    /// The listing being watched
    pub listing_id: ListingId,
    /// Alert fires when the price drops to or below this value
    pub target_price: f64,
    /// The listing price at subscription time
    pub current_price: f64,
}

/// A stored price alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAlert {
    /// Server-assigned identifier
    pub id: AlertId,
    /// The user who wants to be alerted
    pub user: UserId,
    /// The listing being watched
    pub listing_id: ListingId,
    /// Alert fires when the price drops to or below this value
    pub target_price: f64,
    /// The listing price as of the last observed change
    pub current_price: f64,
    /// Server-assigned creation timestamp
    pub created_at: Timestamp,
    /// Server-assigned timestamp of the last update
    pub updated_at: Timestamp,
}

impl PriceAlert {
    /// Whether a price change from `old_price` to `new_price` crosses this
    /// alert's target downward.
    ///
    /// Firing requires an actual crossing (`new <= target < old`), so a
    /// price hovering below the target does not re-fire on every edit.
    pub fn is_crossed_by(&self, old_price: f64, new_price: f64) -> bool {
        new_price <= self.target_price && old_price > self.target_price
    }
}

/// A field-level merge applied to a stored price alert
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceAlertPatch {
    /// Replace the target price
    pub target_price: Option<f64>,
    /// Replace the observed current price
    pub current_price: Option<f64>,
}
