//! InsertOrderItem command handler
//!
//! Adds a line item to a placed order: folds the item's prices into the
//! order totals, reserves inventory, advances the shipping status when
//! the item is shippable, and re-derives the order status.

use crate::error::OrderError;
use crate::orders::context::{CommandContext, CommandHandler};
use crate::orders::items::{advance_shipping_on_add, apply_item_totals};
use crate::orders::status;
use async_trait::async_trait;
use shared::order::OrderItem;
use shared::util::now_millis;

/// InsertOrderItem action
#[derive(Debug, Clone)]
pub struct InsertOrderItemAction {
    pub order_id: String,
    pub item: OrderItem,
}

#[async_trait]
impl CommandHandler for InsertOrderItemAction {
    type Output = ();

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), OrderError> {
        let mut order = ctx.order(&self.order_id).await?;
        let item = &self.item;
        if item.quantity <= 0 {
            return Err(OrderError::validation("Quantity must be positive"));
        }
        if item.open_qty + item.cancel_qty != item.quantity {
            return Err(OrderError::validation(
                "Open and cancelled quantity must add up to the item quantity",
            ));
        }

        // Reserve stock for the added quantity
        if let Some(product) = ctx.services.catalog.product_by_id(&item.product_id).await {
            ctx.services
                .inventory
                .adjust_reserved(
                    &product,
                    -item.quantity,
                    &item.attributes,
                    item.warehouse_id.as_deref(),
                )
                .await;
        }

        apply_item_totals(&mut order, item, 1);
        advance_shipping_on_add(&mut order, item.is_shippable);
        order.items.push(item.clone());
        order.updated_at = now_millis();
        ctx.store.update_order(&order).await?;

        status::check_order_status(ctx, &mut order).await?;
        Ok(())
    }
}
