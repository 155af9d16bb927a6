//! Shipment snapshot model

use serde::{Deserialize, Serialize};

/// One order item's share of a shipment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentItem {
    pub order_item_id: String,
    pub quantity: i32,
}

/// Shipment created against an order
///
/// The checkout core never creates shipments itself; it only reads them
/// for guards (cancel/delete preconditions, item mutation blocks) and
/// for the shipping-status collapse after an item is removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: String,
    pub order_id: String,
    pub items: Vec<ShipmentItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipped_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
}

impl Shipment {
    /// A shipment counts as outstanding until it is delivered.
    pub fn is_delivered(&self) -> bool {
        self.delivered_at.is_some()
    }

    pub fn contains_order_item(&self, order_item_id: &str) -> bool {
        self.items.iter().any(|i| i.order_item_id == order_item_id)
    }
}
