//! Shared helpers for the line-item mutation handlers

use super::context::CommandContext;
use crate::error::OrderError;
use crate::money;
use shared::order::{Order, OrderItem, OrderItemStatus, ShippingStatus};

/// Outcome of a guarded item mutation.
///
/// Blocking conditions are part of the contract, not failures: callers
/// get a typed outcome with a user-facing reason instead of an error.
/// Null-argument-style problems (missing order/item) still raise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemCommandOutcome {
    Applied,
    Blocked { reason: String },
}

impl ItemCommandOutcome {
    pub fn blocked(reason: impl Into<String>) -> Self {
        ItemCommandOutcome::Blocked {
            reason: reason.into(),
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, ItemCommandOutcome::Blocked { .. })
    }
}

/// Fold an item's line totals into the order totals with the given
/// sign, keeping `total = subtotal - discount + shipping + tax`.
pub fn apply_item_totals(order: &mut Order, item: &OrderItem, sign: i32) {
    let line_excl = money::times(item.line_total_excl_tax, sign);
    let line_incl = money::times(item.line_total_incl_tax, sign);
    let line_tax = money::sub(item.line_total_incl_tax, item.line_total_excl_tax);

    order.subtotal_excl_tax = money::add(order.subtotal_excl_tax, line_excl);
    order.subtotal_incl_tax = money::add(order.subtotal_incl_tax, line_incl);
    order.tax_total = money::add(order.tax_total, money::times(line_tax, sign));
    order.total = money::add(
        money::sub(order.subtotal_excl_tax, order.discount_amount),
        money::add(order.shipping_total, order.tax_total),
    );
}

/// Advance the shipping status when a shippable item joins the order.
pub fn advance_shipping_on_add(order: &mut Order, item_is_shippable: bool) {
    if !item_is_shippable {
        return;
    }
    order.shipping_required = true;
    match order.shipping_status {
        // A finished order regains an undelivered item
        ShippingStatus::Delivered | ShippingStatus::Shipped => {
            order.shipping_status = ShippingStatus::PartiallyShipped;
        }
        ShippingStatus::ShippingNotRequired => {
            order.shipping_status = ShippingStatus::NotYetShipped;
        }
        _ => {}
    }
}

/// Collapse `PartiallyShipped` back to `Delivered` after a cancel or
/// delete when no undelivered shipment remains.
pub async fn collapse_shipping_on_remove(
    ctx: &CommandContext<'_>,
    order: &mut Order,
) -> Result<(), OrderError> {
    if order.shipping_status != ShippingStatus::PartiallyShipped {
        return Ok(());
    }
    let shipments = ctx.store.shipments_for_order(&order.id).await?;
    if !shipments.is_empty() && shipments.iter().all(|s| s.is_delivered()) {
        order.shipping_status = ShippingStatus::Delivered;
    }
    Ok(())
}

/// The blocking conditions shared by item cancel and delete.
///
/// Returns the user-facing reason, or `None` when the mutation may
/// proceed. `verb` is "cancel" or "delete" for the message.
pub async fn item_mutation_block(
    ctx: &CommandContext<'_>,
    order: &Order,
    item: &OrderItem,
    verb: &str,
) -> Result<Option<String>, OrderError> {
    let reason = format!("You can't {verb} this order item.");

    if item.status == OrderItemStatus::Closed {
        return Ok(Some(reason));
    }
    if item.open_qty != item.quantity {
        return Ok(Some(reason));
    }
    // Gift voucher items have their own removal workflow
    if let Some(product) = ctx.services.catalog.product_by_id(&item.product_id).await {
        if product.is_gift_voucher {
            return Ok(Some(reason));
        }
    }
    let shipments = ctx.store.shipments_for_order(&order.id).await?;
    if shipments.iter().any(|s| s.contains_order_item(&item.id)) {
        return Ok(Some(reason));
    }
    if !ctx
        .services
        .vouchers
        .purchased_by_order_item(&item.id)
        .await
        .is_empty()
    {
        return Ok(Some(reason));
    }

    Ok(None)
}
