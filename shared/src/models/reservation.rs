//! Calendar-slot reservations for rental-type products

use serde::{Deserialize, Serialize};

/// Temporary hold on a reservation slot, keyed by `(customer_id,
/// cart_item_id)` before any order exists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationHold {
    pub id: String,
    pub customer_id: String,
    pub cart_item_id: String,
    pub reservation_id: String,
}

/// Booked calendar slot, promoted from a hold at placement time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductReservation {
    pub id: String,
    pub product_id: String,
    /// Slot date as `YYYY-MM-DD`
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}
