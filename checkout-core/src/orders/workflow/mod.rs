//! OrderWorkflow facade
//!
//! The public surface of the core: one method per command, typed
//! dispatch to the action handlers, plus signal subscription. Owns the
//! store, the collaborator bundle, the settings snapshot and the
//! broadcast channel.

#[cfg(test)]
mod tests;

use crate::error::OrderError;
use crate::orders::actions::{
    AddOrderNoteAction, CancelOrderAction, CancelOrderItemAction, CaptureAction,
    DeleteOrderAction, DeleteOrderItemAction, InsertOrderItemAction, MarkAsAuthorizedAction,
    MarkAsPaidAction, PartiallyPaidOfflineAction, PartiallyRefundAction,
    PartiallyRefundOfflineAction, PlaceOrderAction, PlaceOrderResult, RefundAction,
    RefundOfflineAction, UpdateOrderItemAction, VoidAction, VoidOfflineAction,
};
use crate::orders::context::{CommandContext, CommandHandler, Services};
use crate::orders::items::ItemCommandOutcome;
use crate::orders::status;
use crate::settings::CheckoutSettings;
use crate::store::OrderStore;
use shared::models::{CheckoutContext, Customer, ShoppingCartItem};
use shared::order::{Order, OrderItem, OrderSignal, OrderStatus, PaymentTransaction};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Signal broadcast channel capacity
const SIGNAL_CHANNEL_CAPACITY: usize = 1024;

/// Checkout order-processing workflow
pub struct OrderWorkflow {
    store: Arc<dyn OrderStore>,
    services: Services,
    settings: CheckoutSettings,
    signal_tx: broadcast::Sender<OrderSignal>,
}

impl OrderWorkflow {
    pub fn new(store: Arc<dyn OrderStore>, services: Services, settings: CheckoutSettings) -> Self {
        let (signal_tx, _) = broadcast::channel(SIGNAL_CHANNEL_CAPACITY);
        Self {
            store,
            services,
            settings,
            signal_tx,
        }
    }

    /// Subscribe to lifecycle signal broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<OrderSignal> {
        self.signal_tx.subscribe()
    }

    fn ctx(&self) -> CommandContext<'_> {
        CommandContext {
            store: self.store.as_ref(),
            services: &self.services,
            settings: &self.settings,
            signals: &self.signal_tx,
        }
    }

    // ========================================================================
    // Placement
    // ========================================================================

    /// Place an order from a validated cart. Never fails: every error
    /// lands in the result's error list.
    pub async fn place_order(
        &self,
        customer: Customer,
        cart: Vec<ShoppingCartItem>,
        checkout: CheckoutContext,
    ) -> PlaceOrderResult {
        let action = PlaceOrderAction {
            customer,
            cart,
            checkout,
        };
        match action.execute(&self.ctx()).await {
            Ok(result) => result,
            Err(err) => PlaceOrderResult {
                order: None,
                transaction: None,
                errors: vec![err.to_string()],
            },
        }
    }

    // ========================================================================
    // Payment transaction operations
    // ========================================================================

    /// Capture an authorized transaction. Empty error list = success.
    pub async fn capture(&self, transaction_id: &str) -> Result<Vec<String>, OrderError> {
        CaptureAction {
            transaction_id: transaction_id.to_string(),
        }
        .execute(&self.ctx())
        .await
    }

    pub async fn mark_as_paid(&self, transaction_id: &str) -> Result<(), OrderError> {
        MarkAsPaidAction {
            transaction_id: transaction_id.to_string(),
        }
        .execute(&self.ctx())
        .await
    }

    pub async fn mark_as_authorized(&self, transaction_id: &str) -> Result<(), OrderError> {
        MarkAsAuthorizedAction {
            transaction_id: transaction_id.to_string(),
        }
        .execute(&self.ctx())
        .await
    }

    pub async fn refund(&self, transaction_id: &str) -> Result<Vec<String>, OrderError> {
        RefundAction {
            transaction_id: transaction_id.to_string(),
        }
        .execute(&self.ctx())
        .await
    }

    pub async fn refund_offline(&self, transaction_id: &str) -> Result<(), OrderError> {
        RefundOfflineAction {
            transaction_id: transaction_id.to_string(),
        }
        .execute(&self.ctx())
        .await
    }

    pub async fn partially_refund(
        &self,
        transaction_id: &str,
        amount: f64,
    ) -> Result<Vec<String>, OrderError> {
        PartiallyRefundAction {
            transaction_id: transaction_id.to_string(),
            amount,
        }
        .execute(&self.ctx())
        .await
    }

    pub async fn partially_refund_offline(
        &self,
        transaction_id: &str,
        amount: f64,
    ) -> Result<(), OrderError> {
        PartiallyRefundOfflineAction {
            transaction_id: transaction_id.to_string(),
            amount,
        }
        .execute(&self.ctx())
        .await
    }

    pub async fn void(&self, transaction_id: &str) -> Result<Vec<String>, OrderError> {
        VoidAction {
            transaction_id: transaction_id.to_string(),
        }
        .execute(&self.ctx())
        .await
    }

    pub async fn void_offline(&self, transaction_id: &str) -> Result<(), OrderError> {
        VoidOfflineAction {
            transaction_id: transaction_id.to_string(),
        }
        .execute(&self.ctx())
        .await
    }

    pub async fn partially_paid_offline(
        &self,
        transaction_id: &str,
        amount: f64,
    ) -> Result<(), OrderError> {
        PartiallyPaidOfflineAction {
            transaction_id: transaction_id.to_string(),
            amount,
        }
        .execute(&self.ctx())
        .await
    }

    // ========================================================================
    // Compensation
    // ========================================================================

    pub async fn cancel_order(
        &self,
        order_id: &str,
        notify_customer: bool,
        notify_store_owner: bool,
    ) -> Result<(), OrderError> {
        CancelOrderAction {
            order_id: order_id.to_string(),
            notify_customer,
            notify_store_owner,
        }
        .execute(&self.ctx())
        .await
    }

    pub async fn delete_order(&self, order_id: &str) -> Result<(), OrderError> {
        DeleteOrderAction {
            order_id: order_id.to_string(),
        }
        .execute(&self.ctx())
        .await
    }

    // ========================================================================
    // Line-item mutations
    // ========================================================================

    pub async fn insert_order_item(
        &self,
        order_id: &str,
        item: OrderItem,
    ) -> Result<(), OrderError> {
        InsertOrderItemAction {
            order_id: order_id.to_string(),
            item,
        }
        .execute(&self.ctx())
        .await
    }

    pub async fn update_order_item(
        &self,
        order_id: &str,
        item: OrderItem,
    ) -> Result<(), OrderError> {
        UpdateOrderItemAction {
            order_id: order_id.to_string(),
            item,
        }
        .execute(&self.ctx())
        .await
    }

    pub async fn cancel_order_item(
        &self,
        order_id: &str,
        order_item_id: &str,
    ) -> Result<ItemCommandOutcome, OrderError> {
        CancelOrderItemAction {
            order_id: order_id.to_string(),
            order_item_id: order_item_id.to_string(),
        }
        .execute(&self.ctx())
        .await
    }

    pub async fn delete_order_item(
        &self,
        order_id: &str,
        order_item_id: &str,
    ) -> Result<ItemCommandOutcome, OrderError> {
        DeleteOrderItemAction {
            order_id: order_id.to_string(),
            order_item_id: order_item_id.to_string(),
        }
        .execute(&self.ctx())
        .await
    }

    pub async fn add_order_note(&self, order_id: &str, note: &str) -> Result<(), OrderError> {
        AddOrderNoteAction {
            order_id: order_id.to_string(),
            note: note.to_string(),
        }
        .execute(&self.ctx())
        .await
    }

    // ========================================================================
    // Status machine and queries
    // ========================================================================

    /// Force an order status; returns whether anything changed.
    pub async fn set_order_status(
        &self,
        order_id: &str,
        target: OrderStatus,
        notify_customer: bool,
        notify_store_owner: bool,
    ) -> Result<bool, OrderError> {
        let ctx = self.ctx();
        let mut order = ctx.order(order_id).await?;
        status::set_order_status(&ctx, &mut order, target, notify_customer, notify_store_owner)
            .await
    }

    /// Re-derive the order status from payment and shipping status.
    pub async fn check_order_status(&self, order_id: &str) -> Result<bool, OrderError> {
        let ctx = self.ctx();
        let mut order = ctx.order(order_id).await?;
        status::check_order_status(&ctx, &mut order).await
    }

    pub async fn order(&self, order_id: &str) -> Result<Option<Order>, OrderError> {
        Ok(self.store.order_by_id(order_id).await?)
    }

    pub async fn transaction(
        &self,
        transaction_id: &str,
    ) -> Result<Option<PaymentTransaction>, OrderError> {
        Ok(self.store.transaction_by_id(transaction_id).await?)
    }
}
