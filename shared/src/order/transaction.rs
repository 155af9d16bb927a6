//! Payment transaction, a sibling aggregate correlated by order GUID

use super::TransactionStatus;
use crate::util::now_millis;
use serde::{Deserialize, Serialize};

/// Record of a single payment-method interaction
///
/// Created as a temporary placeholder during placement (`temp = true`)
/// and finalized once the gateway result is known. Correlated to the
/// order through `order_guid` because it may exist before the order
/// does and must survive placement retries.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaymentTransaction {
    pub id: String,
    pub store_id: String,
    pub customer_id: String,
    pub order_code: String,
    pub order_guid: String,
    pub payment_method: String,
    pub currency_code: String,
    /// Amounts in currency unit
    pub transaction_amount: f64,
    pub paid_amount: f64,
    pub refunded_amount: f64,
    pub status: TransactionStatus,
    /// Placement placeholder, reusable until finalized
    pub temp: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_id: Option<String>,
    /// Accumulated gateway error strings
    #[serde(default)]
    pub errors: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl PaymentTransaction {
    /// New temporary placeholder for a placement attempt.
    pub fn placeholder(
        customer_id: impl Into<String>,
        store_id: impl Into<String>,
    ) -> Self {
        let now = now_millis();
        Self {
            id: crate::util::new_guid(),
            store_id: store_id.into(),
            customer_id: customer_id.into(),
            status: TransactionStatus::Pending,
            temp: true,
            created_at: now,
            updated_at: now,
            ..Default::default()
        }
    }
}
