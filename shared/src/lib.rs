//! Shared domain types for the checkout core
//!
//! Model types used across the workspace: the order aggregate and its
//! statuses, the payment transaction, customer/product/cart snapshots,
//! and the ledger entities touched by placement and compensation.

pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use order::{
    Order, OrderItem, OrderItemStatus, OrderNote, OrderSignal, OrderStatus, PaymentStatus,
    PaymentTransaction, ShippingStatus, TransactionStatus,
};
