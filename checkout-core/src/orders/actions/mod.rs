//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles one
//! specific command type.

mod add_order_note;
mod cancel_order;
mod cancel_order_item;
mod capture;
mod delete_order;
mod delete_order_item;
mod insert_order_item;
mod mark_paid;
mod partial_payment;
mod place_order;
mod refund;
mod update_order_item;
mod void_payment;

pub use add_order_note::AddOrderNoteAction;
pub use cancel_order::CancelOrderAction;
pub use cancel_order_item::CancelOrderItemAction;
pub use capture::CaptureAction;
pub use delete_order::DeleteOrderAction;
pub use delete_order_item::DeleteOrderItemAction;
pub use insert_order_item::InsertOrderItemAction;
pub use mark_paid::{MarkAsAuthorizedAction, MarkAsPaidAction};
pub use partial_payment::PartiallyPaidOfflineAction;
pub use place_order::{PlaceOrderAction, PlaceOrderResult};
pub use refund::{
    PartiallyRefundAction, PartiallyRefundOfflineAction, RefundAction, RefundOfflineAction,
};
pub use update_order_item::UpdateOrderItemAction;
pub use void_payment::{VoidAction, VoidOfflineAction};
