//! DeleteOrder command handler
//!
//! Soft delete. A superset of cancellation for orders that were never
//! cancelled; an already-cancelled order only gets the flag and the
//! note, since its placement effects were reversed when it was
//! cancelled.

use super::cancel_order::reverse_placement_effects;
use crate::error::OrderError;
use crate::orders::context::{CommandContext, CommandHandler};
use async_trait::async_trait;
use shared::order::OrderStatus;
use shared::util::now_millis;

/// DeleteOrder action
#[derive(Debug, Clone)]
pub struct DeleteOrderAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for DeleteOrderAction {
    type Output = ();

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), OrderError> {
        // 1. Own shipment guard, independent of cancellation's
        let mut order = ctx.order(&self.order_id).await?;
        let shipments = ctx.store.shipments_for_order(&order.id).await?;
        if !shipments.is_empty() {
            return Err(OrderError::validation(
                "Order cannot be deleted while shipments exist; delete the shipments first",
            ));
        }

        // 2. Reverse placement effects unless cancellation already did
        if order.order_status != OrderStatus::Cancelled {
            reverse_placement_effects(ctx, &mut order).await?;
            if ctx.settings.order.deactivate_gift_vouchers_on_delete {
                ctx.services.vouchers.deactivate_purchased(&order.id).await;
            }
        }

        // 3. Soft-delete, always
        ctx.services.discounts.cancel_usage(&order.id).await;
        order.deleted = true;
        order.add_note("Order has been deleted");
        order.updated_at = now_millis();
        ctx.store.update_order(&order).await?;

        tracing::info!(order_code = %order.code, "order deleted");
        Ok(())
    }
}
