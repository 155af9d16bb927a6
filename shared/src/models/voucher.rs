//! Gift voucher entity and its redemption ledger

use serde::{Deserialize, Serialize};

/// One redemption of a voucher against an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftVoucherUsage {
    pub order_id: String,
    pub amount_used: f64,
    pub used_at: i64,
}

/// Store-credit instrument purchasable as a product
///
/// Issued one per purchased unit at placement; activation is driven by
/// the order status machine, redemption by later orders.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GiftVoucher {
    pub id: String,
    /// Random `[A-Z0-9]` redemption code (13 characters)
    pub code: String,
    pub amount: f64,
    pub currency_code: String,
    pub activated: bool,
    pub recipient_name: String,
    pub recipient_email: String,
    pub sender_name: String,
    pub sender_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Recipient notification already sent
    pub notified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchased_with_order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchased_with_order_item_id: Option<String>,
    #[serde(default)]
    pub usage: Vec<GiftVoucherUsage>,
}

impl GiftVoucher {
    /// Amount still redeemable on this voucher.
    pub fn remaining_amount(&self) -> f64 {
        let used: f64 = self.usage.iter().map(|u| u.amount_used).sum();
        self.amount - used
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_amount_sums_usage() {
        let mut voucher = GiftVoucher {
            amount: 50.0,
            ..Default::default()
        };
        voucher.usage.push(GiftVoucherUsage {
            order_id: "o1".to_string(),
            amount_used: 20.0,
            used_at: 0,
        });
        voucher.usage.push(GiftVoucherUsage {
            order_id: "o2".to_string(),
            amount_used: 10.0,
            used_at: 0,
        });
        assert_eq!(voucher.remaining_amount(), 20.0);
    }
}
