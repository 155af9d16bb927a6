//! Discount and auction ledger entities

use serde::{Deserialize, Serialize};

/// Discount applied by the pricing aggregator
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Discount {
    pub id: String,
    pub name: String,
}

/// Append-only record of a discount consumed by an order
///
/// Written forward at placement, cancelled in reverse during
/// compensation so discount usage counters stay accurate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountUsage {
    pub discount_id: String,
    pub order_id: String,
    pub created_at: i64,
    pub cancelled: bool,
}

/// Auction bid settled by an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bid {
    pub id: String,
    pub product_id: String,
    pub customer_id: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub won: bool,
}
