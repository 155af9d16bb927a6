//! CancelOrder command handler
//!
//! Compensation workflow: reverses the placement-time side effects in
//! order — status transition (which reduces awarded points and may
//! deactivate vouchers), note, redeemed-point return, inventory
//! release, item closing, ledger cancellation, outstanding-transaction
//! cancellation — then publishes the cancellation signal.

use crate::error::OrderError;
use crate::orders::context::{CommandContext, CommandHandler};
use crate::orders::status;
use async_trait::async_trait;
use shared::order::{Order, OrderSignal, OrderStatus, TransactionStatus};
use shared::util::now_millis;

/// CancelOrder action
#[derive(Debug, Clone)]
pub struct CancelOrderAction {
    pub order_id: String,
    pub notify_customer: bool,
    pub notify_store_owner: bool,
}

#[async_trait]
impl CommandHandler for CancelOrderAction {
    type Output = ();

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), OrderError> {
        // 1. Preconditions
        let mut order = ctx.order(&self.order_id).await?;
        if order.order_status == OrderStatus::Cancelled {
            return Err(OrderError::validation("Order is already cancelled"));
        }
        let shipments = ctx.store.shipments_for_order(&order.id).await?;
        if !shipments.is_empty() {
            return Err(OrderError::validation(
                "Order cannot be cancelled while shipments exist; delete the shipments first",
            ));
        }

        // 2. Status transition fires the cancel-gated effects
        status::set_order_status(
            ctx,
            &mut order,
            OrderStatus::Cancelled,
            self.notify_customer,
            self.notify_store_owner,
        )
        .await?;
        order.add_note("Order has been cancelled");
        ctx.store.update_order(&order).await?;

        // 3. Reverse the placement side effects
        reverse_placement_effects(ctx, &mut order).await?;

        // 4. Cancel any outstanding payment transaction
        if let Some(mut transaction) =
            ctx.store.transaction_by_order_guid(&order.order_guid).await?
        {
            if matches!(
                transaction.status,
                TransactionStatus::Pending | TransactionStatus::Authorized
            ) {
                transaction.status = TransactionStatus::Canceled;
                transaction.updated_at = now_millis();
                ctx.store.update_transaction(&transaction).await?;
            }
        }

        ctx.publish(OrderSignal::Cancelled {
            order_id: order.id.clone(),
        });
        tracing::info!(order_code = %order.code, "order cancelled");
        Ok(())
    }
}

/// Undo placement: return redeemed loyalty points, release reserved
/// inventory per item, close every item, and cancel the reservation,
/// bid and discount ledger entries tied to the order.
///
/// Shared with order deletion, which runs the same reversal for orders
/// that were never cancelled.
pub(super) async fn reverse_placement_effects(
    ctx: &CommandContext<'_>,
    order: &mut Order,
) -> Result<(), OrderError> {
    // Return loyalty points redeemed at placement
    if order.redeemed_points > 0 {
        ctx.services
            .loyalty
            .add_points(
                &order.customer_id,
                &order.id,
                order.redeemed_points,
                &format!("Returned points for cancelled order {}", order.code),
            )
            .await;
    }

    // Release inventory still reserved and close the items
    for item in &mut order.items {
        let release = item.quantity - item.cancel_qty;
        if release > 0 {
            if let Some(product) = ctx.services.catalog.product_by_id(&item.product_id).await {
                ctx.services
                    .inventory
                    .adjust_reserved(
                        &product,
                        release,
                        &item.attributes,
                        item.warehouse_id.as_deref(),
                    )
                    .await;
            } else {
                tracing::warn!(order_code = %order.code, product_id = %item.product_id,
                    "product missing, reserved stock not released");
            }
        }
        item.cancel_qty = item.quantity;
        item.open_qty = 0;
    }
    order.updated_at = now_millis();
    ctx.store.update_order(order).await?;

    ctx.services.reservations.cancel_for_order(&order.id).await;
    ctx.services.auctions.cancel_bids(&order.id).await;
    ctx.services.discounts.cancel_usage(&order.id).await;
    Ok(())
}
