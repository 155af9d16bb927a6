//! DeleteOrderItem command handler
//!
//! Same guard list as cancellation, with the item removed from the
//! order instead of closed.

use crate::error::OrderError;
use crate::orders::context::{CommandContext, CommandHandler};
use crate::orders::items::{
    apply_item_totals, collapse_shipping_on_remove, item_mutation_block, ItemCommandOutcome,
};
use crate::orders::status;
use async_trait::async_trait;
use shared::util::now_millis;

/// DeleteOrderItem action
#[derive(Debug, Clone)]
pub struct DeleteOrderItemAction {
    pub order_id: String,
    pub order_item_id: String,
}

#[async_trait]
impl CommandHandler for DeleteOrderItemAction {
    type Output = ItemCommandOutcome;

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<ItemCommandOutcome, OrderError> {
        let mut order = ctx.order(&self.order_id).await?;
        let item = order
            .item_by_id(&self.order_item_id)
            .cloned()
            .ok_or_else(|| OrderError::ItemNotFound(self.order_item_id.clone()))?;

        if let Some(reason) = item_mutation_block(ctx, &order, &item, "delete").await? {
            return Ok(ItemCommandOutcome::blocked(reason));
        }

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
        order.items.retain(|i| i.id != self.order_item_id);
        collapse_shipping_on_remove(ctx, &mut order).await?;
        order.add_note(format!("Order item {} has been deleted", item.id));
        order.updated_at = now_millis();
        ctx.store.update_order(&order).await?;

        status::check_order_status(ctx, &mut order).await?;
        Ok(ItemCommandOutcome::Applied)
    }
}
