//! UpdateOrderItem command handler
//!
//! Replaces a line item: the order totals take the price delta and the
//! inventory reservation takes the quantity delta.

use crate::error::OrderError;
use crate::orders::context::{CommandContext, CommandHandler};
use crate::orders::items::apply_item_totals;
use crate::orders::status;
use async_trait::async_trait;
use shared::order::OrderItem;
use shared::util::now_millis;

/// UpdateOrderItem action
#[derive(Debug, Clone)]
pub struct UpdateOrderItemAction {
    pub order_id: String,
    pub item: OrderItem,
}

#[async_trait]
impl CommandHandler for UpdateOrderItemAction {
    type Output = ();

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), OrderError> {
        let mut order = ctx.order(&self.order_id).await?;
        let updated = &self.item;
        if updated.quantity <= 0 {
            return Err(OrderError::validation("Quantity must be positive"));
        }
        if updated.open_qty + updated.cancel_qty != updated.quantity {
            return Err(OrderError::validation(
                "Open and cancelled quantity must add up to the item quantity",
            ));
        }
        let existing = order
            .item_by_id(&updated.id)
            .cloned()
            .ok_or_else(|| OrderError::ItemNotFound(updated.id.clone()))?;

        // Inventory takes the signed quantity delta
        let quantity_delta = updated.quantity - existing.quantity;
        if quantity_delta != 0 {
            if let Some(product) = ctx
                .services
                .catalog
                .product_by_id(&updated.product_id)
                .await
            {
                ctx.services
                    .inventory
                    .adjust_reserved(
                        &product,
                        -quantity_delta,
                        &updated.attributes,
                        updated.warehouse_id.as_deref(),
                    )
                    .await;
            }
        }

        // Totals take the price delta: remove the old line, add the new
        apply_item_totals(&mut order, &existing, -1);
        apply_item_totals(&mut order, updated, 1);
        if let Some(slot) = order.item_by_id_mut(&updated.id) {
            *slot = updated.clone();
        }
        order.updated_at = now_millis();
        ctx.store.update_order(&order).await?;

        status::check_order_status(ctx, &mut order).await?;
        Ok(())
    }
}
