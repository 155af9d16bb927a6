//! Capture command handler
//!
//! Captures a previously authorized transaction through its gateway.
//! Returns the accumulated gateway error strings; an empty list means
//! success.

use crate::error::OrderError;
use crate::orders::context::{CommandContext, CommandHandler};
use crate::orders::predicates::can_capture;
use crate::orders::status;
use async_trait::async_trait;
use shared::order::{PaymentStatus, TransactionStatus};
use shared::util::now_millis;

/// Capture action
#[derive(Debug, Clone)]
pub struct CaptureAction {
    pub transaction_id: String,
}

#[async_trait]
impl CommandHandler for CaptureAction {
    type Output = Vec<String>;

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<Vec<String>, OrderError> {
        // 1. Load transaction + correlated order, check capability
        let mut transaction = ctx.transaction(&self.transaction_id).await?;
        let mut order = ctx.order_for_transaction(&transaction).await?;
        let gateway = ctx
            .services
            .gateways
            .by_name(&transaction.payment_method)
            .ok_or_else(|| OrderError::validation("Payment method couldn't be loaded"))?;
        if !can_capture(&transaction, gateway.as_ref()) {
            return Err(OrderError::validation("Cannot do capture for order."));
        }

        // 2. Gateway call; transport errors become result errors
        let mut errors: Vec<String> = Vec::new();
        match gateway.capture(&transaction).await {
            Ok(result) if result.success => {
                transaction.status = result.new_status;
                transaction.paid_amount = transaction.transaction_amount;
                if result.capture_id.is_some() {
                    transaction.capture_id = result.capture_id;
                }
                transaction.updated_at = now_millis();
                ctx.store.update_transaction(&transaction).await?;

                if transaction.status == TransactionStatus::Paid {
                    order.payment_status = PaymentStatus::Paid;
                    order.paid_amount = order.total;
                    order.paid_at = Some(now_millis());
                    order.updated_at = now_millis();
                    ctx.store.update_order(&order).await?;
                    status::process_order_paid(ctx, &order).await;
                }
                status::check_order_status(ctx, &mut order).await?;
            }
            Ok(result) => errors.extend(result.errors),
            Err(e) => errors.push(e.to_string()),
        }

        // 3. Record failures on the transaction
        if !errors.is_empty() {
            transaction.errors.extend(errors.iter().cloned());
            transaction.updated_at = now_millis();
            ctx.store.update_transaction(&transaction).await?;
            tracing::error!(order_code = %transaction.order_code,
                error = %errors.join("; "), "capture failed");
        }

        Ok(errors)
    }
}
