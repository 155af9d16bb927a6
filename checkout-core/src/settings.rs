//! Immutable configuration snapshots
//!
//! Passed by value into the workflow at construction; never mutated at
//! runtime. Callers that need different settings build a new workflow.

use serde::{Deserialize, Serialize};
use shared::order::OrderStatus;

/// Order placement and lifecycle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSettings {
    /// Allow unapproved guest customers to place orders
    pub anonymous_checkout_allowed: bool,
    /// Inclusive bounds on the order grand total
    pub min_order_total: Option<f64>,
    pub max_order_total: Option<f64>,
    /// Require `Delivered` (not just `Shipped`) before completing
    pub complete_order_when_delivered: bool,
    /// Length of the random `[A-Z0-9]` order code
    pub order_code_length: usize,
    /// Attach the invoice to the completed-order customer message
    pub attach_invoice_on_completed: bool,
    /// Order status that activates purchased gift vouchers
    pub gift_voucher_activation_on: Option<OrderStatus>,
    pub deactivate_gift_vouchers_on_cancel: bool,
    pub deactivate_gift_vouchers_on_delete: bool,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            anonymous_checkout_allowed: true,
            min_order_total: None,
            max_order_total: None,
            complete_order_when_delivered: false,
            order_code_length: 8,
            attach_invoice_on_completed: false,
            gift_voucher_activation_on: Some(OrderStatus::Complete),
            deactivate_gift_vouchers_on_cancel: false,
            deactivate_gift_vouchers_on_delete: false,
        }
    }
}

/// Loyalty point earning and reversal settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyPointsSettings {
    pub enabled: bool,
    /// Spend step: every `points_for_purchase_amount` of currency earns
    /// `points_for_purchase_points` points
    pub points_for_purchase_amount: f64,
    pub points_for_purchase_points: i32,
    /// Order status that triggers the award
    pub award_on_status: Option<OrderStatus>,
    /// Take awarded points back when the order is cancelled
    pub reduce_on_cancel: bool,
}

impl Default for LoyaltyPointsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            points_for_purchase_amount: 10.0,
            points_for_purchase_points: 1,
            award_on_status: Some(OrderStatus::Complete),
            reduce_on_cancel: true,
        }
    }
}

/// Settings bundle handed to the workflow
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutSettings {
    pub order: OrderSettings,
    pub loyalty: LoyaltyPointsSettings,
}
