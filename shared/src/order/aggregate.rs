//! Order aggregate root and its owned entities

use super::{OrderItemStatus, OrderStatus, PaymentStatus, ShippingStatus};
use crate::models::Address;
use crate::util::now_millis;
use serde::{Deserialize, Serialize};

/// One line item, exclusively owned by its order
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderItem {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i32,
    /// Quantity not yet cancelled or delivered
    pub open_qty: i32,
    pub cancel_qty: i32,
    /// Prices in currency unit
    pub unit_price_excl_tax: f64,
    pub unit_price_incl_tax: f64,
    pub line_total_excl_tax: f64,
    pub line_total_incl_tax: f64,
    /// Attribute combination snapshot, serialized by the cart layer
    #[serde(default)]
    pub attributes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    pub is_shippable: bool,
    pub status: OrderItemStatus,
}

/// Tax amount accrued at one rate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderTax {
    /// Rate in percent
    pub rate: f64,
    /// Amount in currency unit
    pub amount: f64,
}

/// Append-only order note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderNote {
    pub text: String,
    pub created_at: i64,
}

/// Order aggregate root
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Order {
    pub id: String,
    /// Random `[A-Z0-9]` code shown to customers
    pub code: String,
    /// Correlates the payment transaction (no hard foreign key)
    pub order_guid: String,
    pub customer_id: String,
    pub store_id: String,
    pub currency_code: String,
    pub currency_rate: f64,
    pub language_id: String,
    pub billing_address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<Address>,
    pub shipping_required: bool,
    pub payment_method: String,
    #[serde(default)]
    pub checkout_attributes: String,
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub taxes: Vec<OrderTax>,

    // Monetary totals in currency unit, rounded to 6 decimal places
    pub subtotal_excl_tax: f64,
    pub subtotal_incl_tax: f64,
    pub discount_amount: f64,
    pub shipping_total: f64,
    pub tax_total: f64,
    pub total: f64,
    pub paid_amount: f64,
    pub refunded_amount: f64,

    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub shipping_status: ShippingStatus,

    // Loyalty counters
    pub redeemed_points: i32,
    pub redeemed_points_amount: f64,
    pub awarded_points: i32,

    #[serde(default)]
    pub applied_discount_ids: Vec<String>,
    pub deleted: bool,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<i64>,
    #[serde(default)]
    pub notes: Vec<OrderNote>,
}

impl Order {
    pub fn item_by_id(&self, order_item_id: &str) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.id == order_item_id)
    }

    pub fn item_by_id_mut(&mut self, order_item_id: &str) -> Option<&mut OrderItem> {
        self.items.iter_mut().find(|i| i.id == order_item_id)
    }

    /// Append a note and refresh the audit timestamp.
    pub fn add_note(&mut self, text: impl Into<String>) {
        let now = now_millis();
        self.notes.push(OrderNote {
            text: text.into(),
            created_at: now,
        });
        self.updated_at = now;
    }

    /// Distinct vendor ids represented among the line items.
    pub fn vendor_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .items
            .iter()
            .filter_map(|i| i.vendor_id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_ids_deduplicates() {
        let mut order = Order::default();
        for vendor in ["v2", "v1", "v2"] {
            order.items.push(OrderItem {
                vendor_id: Some(vendor.to_string()),
                ..Default::default()
            });
        }
        order.items.push(OrderItem::default());
        assert_eq!(order.vendor_ids(), vec!["v1".to_string(), "v2".to_string()]);
    }

    #[test]
    fn test_add_note_appends() {
        let mut order = Order::default();
        order.add_note("first");
        order.add_note("second");
        assert_eq!(order.notes.len(), 2);
        assert_eq!(order.notes[0].text, "first");
    }
}
