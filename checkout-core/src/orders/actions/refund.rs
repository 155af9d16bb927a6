//! Refund command handlers (online and offline, full and partial)
//!
//! Online variants call the gateway and only mutate state on success;
//! offline variants record money the store owner moved outside the
//! gateway. Either way the transaction and order accumulate
//! `refunded_amount` with the same threshold rule: `Refunded` once the
//! refunded total covers the transaction amount (or order total), else
//! `PartiallyRefunded`.

use crate::error::OrderError;
use crate::money;
use crate::orders::context::{CommandContext, CommandHandler};
use crate::orders::predicates::{
    can_partially_refund, can_partially_refund_offline, can_refund, can_refund_offline,
};
use crate::orders::status;
use crate::services::RefundRequest;
use async_trait::async_trait;
use shared::order::{
    Order, OrderSignal, PaymentStatus, PaymentTransaction, TransactionStatus,
};
use shared::util::now_millis;

/// Accumulate a successful refund onto the transaction and its order,
/// then notify and publish. Shared by every refund variant.
async fn apply_refund(
    ctx: &CommandContext<'_>,
    transaction: &mut PaymentTransaction,
    order: &mut Order,
    amount: f64,
) -> Result<(), OrderError> {
    transaction.refunded_amount = money::add(transaction.refunded_amount, amount);
    transaction.status = if money::gte(transaction.refunded_amount, transaction.transaction_amount)
    {
        TransactionStatus::Refunded
    } else {
        TransactionStatus::PartiallyRefunded
    };
    transaction.updated_at = now_millis();
    ctx.store.update_transaction(transaction).await?;

    order.refunded_amount = money::add(order.refunded_amount, amount);
    order.payment_status = if money::gte(order.refunded_amount, order.total) {
        PaymentStatus::Refunded
    } else {
        PaymentStatus::PartiallyRefunded
    };
    order.add_note(format!("Order has been refunded. Amount = {amount}"));
    ctx.store.update_order(order).await?;

    if let Err(e) = ctx
        .services
        .messenger
        .order_refunded_customer(order, amount)
        .await
    {
        tracing::error!(order_code = %order.code, error = %e,
            "failed to send refunded-order customer notification");
    }
    if let Err(e) = ctx
        .services
        .messenger
        .order_refunded_store_owner(order, amount)
        .await
    {
        tracing::error!(order_code = %order.code, error = %e,
            "failed to send refunded-order store owner notification");
    }
    ctx.publish(OrderSignal::Refunded {
        order_id: order.id.clone(),
        amount,
    });

    status::check_order_status(ctx, order).await?;
    Ok(())
}

/// Run the gateway refund; on success apply the shared state mutation.
/// Returns gateway error strings (empty = success).
async fn refund_via_gateway(
    ctx: &CommandContext<'_>,
    transaction: &mut PaymentTransaction,
    order: &mut Order,
    amount: f64,
    is_partial: bool,
) -> Result<Vec<String>, OrderError> {
    let gateway = ctx
        .services
        .gateways
        .by_name(&transaction.payment_method)
        .ok_or_else(|| OrderError::validation("Payment method couldn't be loaded"))?;

    let request = RefundRequest {
        transaction: transaction.clone(),
        amount,
        is_partial,
    };
    let mut errors: Vec<String> = Vec::new();
    match gateway.refund(&request).await {
        Ok(result) if result.success => {
            apply_refund(ctx, transaction, order, amount).await?;
        }
        Ok(result) => errors.extend(result.errors),
        Err(e) => errors.push(e.to_string()),
    }

    if !errors.is_empty() {
        transaction.errors.extend(errors.iter().cloned());
        transaction.updated_at = now_millis();
        ctx.store.update_transaction(transaction).await?;
        tracing::error!(order_code = %transaction.order_code,
            error = %errors.join("; "), "refund failed");
    }
    Ok(errors)
}

/// Full online refund
#[derive(Debug, Clone)]
pub struct RefundAction {
    pub transaction_id: String,
}

#[async_trait]
impl CommandHandler for RefundAction {
    type Output = Vec<String>;

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<Vec<String>, OrderError> {
        let mut transaction = ctx.transaction(&self.transaction_id).await?;
        let mut order = ctx.order_for_transaction(&transaction).await?;
        let gateway = ctx
            .services
            .gateways
            .by_name(&transaction.payment_method)
            .ok_or_else(|| OrderError::validation("Payment method couldn't be loaded"))?;
        if !can_refund(&transaction, gateway.as_ref()) {
            return Err(OrderError::validation("Cannot do refund for order."));
        }
        let amount = transaction.paid_amount;
        refund_via_gateway(ctx, &mut transaction, &mut order, amount, false).await
    }
}

/// Full offline refund
#[derive(Debug, Clone)]
pub struct RefundOfflineAction {
    pub transaction_id: String,
}

#[async_trait]
impl CommandHandler for RefundOfflineAction {
    type Output = ();

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), OrderError> {
        let mut transaction = ctx.transaction(&self.transaction_id).await?;
        let mut order = ctx.order_for_transaction(&transaction).await?;
        if !can_refund_offline(&transaction) {
            return Err(OrderError::validation("Cannot do refund for order."));
        }
        let amount = transaction.paid_amount;
        apply_refund(ctx, &mut transaction, &mut order, amount).await
    }
}

/// Partial online refund
#[derive(Debug, Clone)]
pub struct PartiallyRefundAction {
    pub transaction_id: String,
    pub amount: f64,
}

#[async_trait]
impl CommandHandler for PartiallyRefundAction {
    type Output = Vec<String>;

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<Vec<String>, OrderError> {
        let mut transaction = ctx.transaction(&self.transaction_id).await?;
        let mut order = ctx.order_for_transaction(&transaction).await?;
        let gateway = ctx
            .services
            .gateways
            .by_name(&transaction.payment_method)
            .ok_or_else(|| OrderError::validation("Payment method couldn't be loaded"))?;
        if !can_partially_refund(&transaction, self.amount, gateway.as_ref()) {
            return Err(OrderError::validation(
                "Cannot do partial refund for order.",
            ));
        }
        refund_via_gateway(ctx, &mut transaction, &mut order, self.amount, true).await
    }
}

/// Partial offline refund
#[derive(Debug, Clone)]
pub struct PartiallyRefundOfflineAction {
    pub transaction_id: String,
    pub amount: f64,
}

#[async_trait]
impl CommandHandler for PartiallyRefundOfflineAction {
    type Output = ();

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), OrderError> {
        let mut transaction = ctx.transaction(&self.transaction_id).await?;
        let mut order = ctx.order_for_transaction(&transaction).await?;
        if !can_partially_refund_offline(&transaction, self.amount) {
            return Err(OrderError::validation(
                "Cannot do partial refund for order.",
            ));
        }
        apply_refund(ctx, &mut transaction, &mut order, self.amount).await
    }
}
