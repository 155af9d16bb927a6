//! PartiallyPaidOffline command handler
//!
//! Records money received outside the gateway. Crossing the
//! transaction amount flips the transaction (and the order, against
//! its own total) to `Paid` and fires the order-paid effects.

use crate::error::OrderError;
use crate::money;
use crate::orders::context::{CommandContext, CommandHandler};
use crate::orders::predicates::can_partially_paid;
use crate::orders::status;
use async_trait::async_trait;
use shared::order::{PaymentStatus, TransactionStatus};
use shared::util::now_millis;

/// PartiallyPaidOffline action
#[derive(Debug, Clone)]
pub struct PartiallyPaidOfflineAction {
    pub transaction_id: String,
    pub amount: f64,
}

#[async_trait]
impl CommandHandler for PartiallyPaidOfflineAction {
    type Output = ();

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), OrderError> {
        let mut transaction = ctx.transaction(&self.transaction_id).await?;
        let mut order = ctx.order_for_transaction(&transaction).await?;
        if !can_partially_paid(&transaction, self.amount) {
            return Err(OrderError::validation(
                "Cannot do partial payment for order.",
            ));
        }

        transaction.paid_amount = money::add(transaction.paid_amount, self.amount);
        transaction.status =
            if money::gte(transaction.paid_amount, transaction.transaction_amount) {
                TransactionStatus::Paid
            } else {
                TransactionStatus::PartiallyPaid
            };
        transaction.updated_at = now_millis();
        ctx.store.update_transaction(&transaction).await?;

        order.paid_amount = money::add(order.paid_amount, self.amount);
        let crossed = money::gte(order.paid_amount, order.total);
        order.payment_status = if crossed {
            PaymentStatus::Paid
        } else {
            PaymentStatus::PartiallyPaid
        };
        if crossed {
            order.paid_at = Some(now_millis());
        }
        order.add_note(format!(
            "Order has been partially paid. Amount = {}",
            self.amount
        ));
        ctx.store.update_order(&order).await?;

        if crossed {
            status::process_order_paid(ctx, &order).await;
        }
        status::check_order_status(ctx, &mut order).await?;
        Ok(())
    }
}
