//! CancelOrderItem command handler
//!
//! Guarded: a closed item, an item with cancelled quantity, a gift
//! voucher product, or an item linked to a shipment or an issued
//! voucher blocks the cancel with a typed outcome instead of an error.
//! Nothing is mutated on a blocked outcome.

use crate::error::OrderError;
use crate::orders::context::{CommandContext, CommandHandler};
use crate::orders::items::{
    apply_item_totals, collapse_shipping_on_remove, item_mutation_block, ItemCommandOutcome,
};
use crate::orders::status;
use async_trait::async_trait;
use shared::order::OrderItemStatus;
use shared::util::now_millis;

/// CancelOrderItem action
#[derive(Debug, Clone)]
pub struct CancelOrderItemAction {
    pub order_id: String,
    pub order_item_id: String,
}

#[async_trait]
impl CommandHandler for CancelOrderItemAction {
    type Output = ItemCommandOutcome;

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<ItemCommandOutcome, OrderError> {
        let mut order = ctx.order(&self.order_id).await?;
        let item = order
            .item_by_id(&self.order_item_id)
            .cloned()
            .ok_or_else(|| OrderError::ItemNotFound(self.order_item_id.clone()))?;

        if let Some(reason) = item_mutation_block(ctx, &order, &item, "cancel").await? {
            return Ok(ItemCommandOutcome::blocked(reason));
        }

        // Release the reserved stock
        if let Some(product) = ctx.services.catalog.product_by_id(&item.product_id).await {
            ctx.services
                .inventory
                .adjust_reserved(
                    &product,
                    item.quantity,
                    &item.attributes,
                    item.warehouse_id.as_deref(),
                )
                .await;
        }

        apply_item_totals(&mut order, &item, -1);
        if let Some(slot) = order.item_by_id_mut(&self.order_item_id) {
            slot.cancel_qty = slot.quantity;
            slot.open_qty = 0;
            slot.status = OrderItemStatus::Closed;
        }
        collapse_shipping_on_remove(ctx, &mut order).await?;
        order.add_note(format!("Order item {} has been cancelled", item.id));
        order.updated_at = now_millis();
        ctx.store.update_order(&order).await?;

        status::check_order_status(ctx, &mut order).await?;
        Ok(ItemCommandOutcome::Applied)
    }
}
