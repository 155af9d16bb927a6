//! Void command handlers (online and offline)

use crate::error::OrderError;
use crate::orders::context::{CommandContext, CommandHandler};
use crate::orders::predicates::{can_void, can_void_offline};
use crate::orders::status;
use async_trait::async_trait;
use shared::order::{Order, PaymentStatus, PaymentTransaction, TransactionStatus};
use shared::util::now_millis;

async fn apply_void(
    ctx: &CommandContext<'_>,
    transaction: &mut PaymentTransaction,
    order: &mut Order,
) -> Result<(), OrderError> {
    transaction.status = TransactionStatus::Voided;
    transaction.updated_at = now_millis();
    ctx.store.update_transaction(transaction).await?;

    order.payment_status = PaymentStatus::Voided;
    order.add_note("Order has been voided");
    ctx.store.update_order(order).await?;

    status::check_order_status(ctx, order).await?;
    Ok(())
}

/// Online void through the gateway
#[derive(Debug, Clone)]
pub struct VoidAction {
    pub transaction_id: String,
}

#[async_trait]
impl CommandHandler for VoidAction {
    type Output = Vec<String>;

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<Vec<String>, OrderError> {
        let mut transaction = ctx.transaction(&self.transaction_id).await?;
        let mut order = ctx.order_for_transaction(&transaction).await?;
        let gateway = ctx
            .services
            .gateways
            .by_name(&transaction.payment_method)
            .ok_or_else(|| OrderError::validation("Payment method couldn't be loaded"))?;
        if !can_void(&transaction, gateway.as_ref()) {
            return Err(OrderError::validation("Cannot do void for order."));
        }

        let mut errors: Vec<String> = Vec::new();
        match gateway.void(&transaction).await {
            Ok(result) if result.success => {
                apply_void(ctx, &mut transaction, &mut order).await?;
            }
            Ok(result) => errors.extend(result.errors),
            Err(e) => errors.push(e.to_string()),
        }

        if !errors.is_empty() {
            transaction.errors.extend(errors.iter().cloned());
            transaction.updated_at = now_millis();
            ctx.store.update_transaction(&transaction).await?;
            tracing::error!(order_code = %transaction.order_code,
                error = %errors.join("; "), "void failed");
        }
        Ok(errors)
    }
}

/// Offline void, no gateway involved
#[derive(Debug, Clone)]
pub struct VoidOfflineAction {
    pub transaction_id: String,
}

#[async_trait]
impl CommandHandler for VoidOfflineAction {
    type Output = ();

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), OrderError> {
        let mut transaction = ctx.transaction(&self.transaction_id).await?;
        let mut order = ctx.order_for_transaction(&transaction).await?;
        if !can_void_offline(&transaction) {
            return Err(OrderError::validation("Cannot do void for order."));
        }
        apply_void(ctx, &mut transaction, &mut order).await
    }
}
