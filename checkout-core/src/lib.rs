//! Checkout order-processing core
//!
//! Turns a validated shopping cart into a persisted order and drives it
//! through payment and fulfillment state to a terminal status,
//! including compensation (cancel/delete) flows.
//!
//! # Architecture
//!
//! ```text
//! PlaceOrder → totals → gateway → Order + PaymentTransaction
//!                                        ↓
//!                              check_order_status
//!                                        ↓
//!               capture / refund / void / item edits / cancel
//!                                        ↓
//!                        Broadcast (OrderSignal subscribers)
//! ```
//!
//! - **orders**: per-command action handlers, the order-status and
//!   payment-transaction state machines, and the `OrderWorkflow` facade
//! - **services**: narrow async contracts for every external
//!   collaborator, plus recording in-memory implementations
//! - **store**: the persistence seam and its in-memory implementation
//! - **money**: `rust_decimal`-backed arithmetic over `f64`-at-rest
//!   monetary fields, rounded to 6 decimal places

pub mod error;
pub mod loyalty;
pub mod money;
pub mod orders;
pub mod services;
pub mod settings;
pub mod store;

// Re-exports
pub use error::OrderError;
pub use orders::workflow::OrderWorkflow;
pub use orders::{CommandContext, CommandHandler, Services};
pub use settings::{CheckoutSettings, LoyaltyPointsSettings, OrderSettings};
pub use store::{OrderStore, StoreError};

// Re-export shared types for convenience
pub use shared::order::{
    Order, OrderItem, OrderItemStatus, OrderSignal, OrderStatus, PaymentStatus,
    PaymentTransaction, ShippingStatus, TransactionStatus,
};
