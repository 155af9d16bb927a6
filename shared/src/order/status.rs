//! Status enums for the order, payment, shipping and transaction machines

use serde::{Deserialize, Serialize};

/// Coarse lifecycle stage of an order
///
/// `Cancelled` and `Complete` are terminal: the derivation function
/// never moves an order out of them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Cancelled,
    Complete,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Complete)
    }
}

/// Payment state mirrored onto the order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Authorized,
    Paid,
    PartiallyPaid,
    PartiallyRefunded,
    Refunded,
    Voided,
}

/// Fulfillment state, maintained loosely by the shipping subsystem
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShippingStatus {
    ShippingNotRequired,
    #[default]
    NotYetShipped,
    PartiallyShipped,
    Shipped,
    Delivered,
}

/// Status of a single payment transaction
///
/// `Canceled` marks a placeholder transaction abandoned by order-level
/// cancellation before any gateway money moved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Authorized,
    Paid,
    PartiallyPaid,
    PartiallyRefunded,
    Refunded,
    Voided,
    Canceled,
}

/// Order item lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderItemStatus {
    #[default]
    Open,
    Closed,
}
