//! MarkAsPaid / MarkAsAuthorized command handlers
//!
//! Administrative shortcuts bypassing the gateway, still gated by the
//! capability predicates.

use crate::error::OrderError;
use crate::orders::context::{CommandContext, CommandHandler};
use crate::orders::predicates::{can_mark_as_authorized, can_mark_as_paid};
use crate::orders::status;
use async_trait::async_trait;
use shared::order::{PaymentStatus, TransactionStatus};
use shared::util::now_millis;

/// MarkAsPaid action
#[derive(Debug, Clone)]
pub struct MarkAsPaidAction {
    pub transaction_id: String,
}

#[async_trait]
impl CommandHandler for MarkAsPaidAction {
    type Output = ();

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), OrderError> {
        let mut transaction = ctx.transaction(&self.transaction_id).await?;
        let mut order = ctx.order_for_transaction(&transaction).await?;
        if !can_mark_as_paid(&transaction) {
            return Err(OrderError::validation("You can't mark this order as paid"));
        }

        transaction.status = TransactionStatus::Paid;
        transaction.paid_amount = transaction.transaction_amount;
        transaction.updated_at = now_millis();
        ctx.store.update_transaction(&transaction).await?;

        order.payment_status = PaymentStatus::Paid;
        order.paid_amount = order.total;
        order.paid_at = Some(now_millis());
        order.add_note("Order has been marked as paid");
        ctx.store.update_order(&order).await?;

        status::process_order_paid(ctx, &order).await;
        status::check_order_status(ctx, &mut order).await?;
        Ok(())
    }
}

/// MarkAsAuthorized action
#[derive(Debug, Clone)]
pub struct MarkAsAuthorizedAction {
    pub transaction_id: String,
}

#[async_trait]
impl CommandHandler for MarkAsAuthorizedAction {
    type Output = ();

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), OrderError> {
        let mut transaction = ctx.transaction(&self.transaction_id).await?;
        let mut order = ctx.order_for_transaction(&transaction).await?;
        if !can_mark_as_authorized(&transaction) {
            return Err(OrderError::validation(
                "You can't authorize this order",
            ));
        }

        transaction.status = TransactionStatus::Authorized;
        transaction.updated_at = now_millis();
        ctx.store.update_transaction(&transaction).await?;

        order.payment_status = PaymentStatus::Authorized;
        order.add_note("Order has been marked as authorized");
        ctx.store.update_order(&order).await?;

        status::check_order_status(ctx, &mut order).await?;
        Ok(())
    }
}
