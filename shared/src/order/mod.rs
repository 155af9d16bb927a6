//! Order aggregate, statuses, payment transaction and broadcast signals

mod aggregate;
mod signal;
mod status;
mod transaction;

pub use aggregate::{Order, OrderItem, OrderNote, OrderTax};
pub use signal::OrderSignal;
pub use status::{OrderItemStatus, OrderStatus, PaymentStatus, ShippingStatus, TransactionStatus};
pub use transaction::PaymentTransaction;
