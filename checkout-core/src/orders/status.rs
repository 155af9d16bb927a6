//! Order status state machine
//!
//! One explicit transition-effects table instead of status checks
//! scattered across call sites: `set_order_status` applies the write,
//! then fires the effects computed for `(previous, next, notify
//! flags)`. Same-status transitions are no-ops and terminal states are
//! short-circuited centrally in `check_order_status`.
//!
//! Transitions are otherwise permissive: administrative flows are
//! allowed to force any status, matching the trusted-caller contract.

use super::context::CommandContext;
use crate::error::OrderError;
use crate::loyalty::points_for_amount;
use shared::order::{Order, OrderSignal, OrderStatus, PaymentStatus, ShippingStatus};
use shared::util::now_millis;

/// Side effect fired after a persisted status transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEffect {
    NotifyCompletedCustomer,
    NotifyCancelledCustomer,
    NotifyCancelledStoreOwner,
    AwardLoyaltyPoints,
    ReduceLoyaltyPoints,
    ActivateGiftVouchers,
    DeactivateGiftVouchers,
}

/// The transition table: `(previous, next, flags) → effects`.
///
/// `previous` only matters in that the caller already filtered out the
/// same-status case; effects key off the target status and settings.
pub fn transition_effects(
    previous: OrderStatus,
    next: OrderStatus,
    notify_customer: bool,
    notify_store_owner: bool,
    settings: &crate::settings::CheckoutSettings,
) -> Vec<StatusEffect> {
    debug_assert_ne!(previous, next);
    let mut effects = Vec::new();

    if next == OrderStatus::Complete && notify_customer {
        effects.push(StatusEffect::NotifyCompletedCustomer);
    }
    if next == OrderStatus::Cancelled && notify_customer {
        effects.push(StatusEffect::NotifyCancelledCustomer);
    }
    if next == OrderStatus::Cancelled && notify_store_owner {
        effects.push(StatusEffect::NotifyCancelledStoreOwner);
    }
    if settings.loyalty.award_on_status == Some(next) {
        effects.push(StatusEffect::AwardLoyaltyPoints);
    }
    if next == OrderStatus::Cancelled && settings.loyalty.reduce_on_cancel {
        effects.push(StatusEffect::ReduceLoyaltyPoints);
    }
    if settings.order.gift_voucher_activation_on == Some(next) {
        effects.push(StatusEffect::ActivateGiftVouchers);
    }
    if next == OrderStatus::Cancelled && settings.order.deactivate_gift_vouchers_on_cancel {
        effects.push(StatusEffect::DeactivateGiftVouchers);
    }

    effects
}

/// Apply a status transition and fire its downstream effects.
///
/// Returns `false` without writing anything when the order is already
/// in the target status. Effects run strictly after the status write is
/// persisted; notification failures are logged and swallowed.
pub async fn set_order_status(
    ctx: &CommandContext<'_>,
    order: &mut Order,
    target: OrderStatus,
    notify_customer: bool,
    notify_store_owner: bool,
) -> Result<bool, OrderError> {
    if order.order_status == target {
        return Ok(false);
    }

    let previous = order.order_status;
    order.order_status = target;
    order.updated_at = now_millis();
    ctx.store.update_order(order).await?;

    tracing::info!(
        order_code = %order.code,
        from = ?previous,
        to = ?target,
        "order status changed"
    );

    let effects = transition_effects(
        previous,
        target,
        notify_customer,
        notify_store_owner,
        ctx.settings,
    );
    for effect in effects {
        apply_effect(ctx, order, effect).await?;
    }

    Ok(true)
}

async fn apply_effect(
    ctx: &CommandContext<'_>,
    order: &mut Order,
    effect: StatusEffect,
) -> Result<(), OrderError> {
    match effect {
        StatusEffect::NotifyCompletedCustomer => {
            let attach_invoice = ctx.settings.order.attach_invoice_on_completed;
            match ctx
                .services
                .messenger
                .order_completed_customer(order, attach_invoice)
                .await
            {
                Ok(queued_id) if queued_id > 0 => {
                    order.add_note("\"Order completed\" email (to customer) has been queued");
                    ctx.store.update_order(order).await?;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(order_code = %order.code, error = %e,
                        "failed to send completed-order notification");
                }
            }
        }
        StatusEffect::NotifyCancelledCustomer => {
            if let Err(e) = ctx.services.messenger.order_cancelled_customer(order).await {
                tracing::error!(order_code = %order.code, error = %e,
                    "failed to send cancelled-order notification");
            }
            notify_order_vendors(ctx, order, VendorMessage::Cancelled).await;
        }
        StatusEffect::NotifyCancelledStoreOwner => {
            notify_order_vendors(ctx, order, VendorMessage::CancelledStoreOwner).await;
            order.add_note("\"Order cancelled\" email (to store owner) has been queued");
            ctx.store.update_order(order).await?;
        }
        StatusEffect::AwardLoyaltyPoints => {
            award_loyalty_points(ctx, order).await?;
        }
        StatusEffect::ReduceLoyaltyPoints => {
            reduce_loyalty_points(ctx, order).await;
        }
        StatusEffect::ActivateGiftVouchers => {
            ctx.services.vouchers.activate_purchased(&order.id).await;
        }
        StatusEffect::DeactivateGiftVouchers => {
            ctx.services.vouchers.deactivate_purchased(&order.id).await;
        }
    }
    Ok(())
}

/// Which message a vendor sweep delivers
#[derive(Clone, Copy)]
pub(crate) enum VendorMessage {
    Placed,
    Paid,
    Cancelled,
    CancelledStoreOwner,
}

/// Notify every active, non-deleted vendor represented among the
/// order's line items. Delivery failures are logged, never raised.
pub(crate) async fn notify_order_vendors(
    ctx: &CommandContext<'_>,
    order: &Order,
    message: VendorMessage,
) {
    for vendor_id in order.vendor_ids() {
        let Some(vendor) = ctx.services.catalog.vendor_by_id(&vendor_id).await else {
            continue;
        };
        if !vendor.active || vendor.deleted {
            continue;
        }
        let sent = match message {
            VendorMessage::Placed => {
                ctx.services
                    .messenger
                    .order_placed_vendor(order, &vendor)
                    .await
            }
            VendorMessage::Paid => {
                ctx.services
                    .messenger
                    .order_paid_vendor(order, &vendor)
                    .await
            }
            VendorMessage::Cancelled => {
                ctx.services
                    .messenger
                    .order_cancelled_vendor(order, &vendor)
                    .await
            }
            VendorMessage::CancelledStoreOwner => {
                ctx.services
                    .messenger
                    .order_cancelled_store_owner(order, &vendor)
                    .await
            }
        };
        if let Err(e) = sent {
            tracing::error!(order_code = %order.code, vendor_id = %vendor.id, error = %e,
                "failed to send vendor notification");
        }
    }
}

async fn award_loyalty_points(
    ctx: &CommandContext<'_>,
    order: &mut Order,
) -> Result<(), OrderError> {
    // Award at most once per order
    if !ctx.settings.loyalty.enabled || order.awarded_points != 0 {
        return Ok(());
    }
    let points = points_for_amount(&ctx.settings.loyalty, order.total);
    if points <= 0 {
        return Ok(());
    }
    ctx.services
        .loyalty
        .add_points(
            &order.customer_id,
            &order.id,
            points,
            &format!("Earned points for order {}", order.code),
        )
        .await;
    order.awarded_points = points;
    order.updated_at = now_millis();
    ctx.store.update_order(order).await?;
    Ok(())
}

async fn reduce_loyalty_points(ctx: &CommandContext<'_>, order: &Order) {
    if !ctx.settings.loyalty.enabled || order.awarded_points <= 0 {
        return;
    }
    ctx.services
        .loyalty
        .reduce_points(
            &order.customer_id,
            &order.id,
            order.awarded_points,
            &format!("Reduced points for cancelled order {}", order.code),
        )
        .await;
}

/// Derive the order status from its payment and shipping status.
///
/// Invoked after every mutation that might change either. Returns
/// whether the order status changed.
pub async fn check_order_status(
    ctx: &CommandContext<'_>,
    order: &mut Order,
) -> Result<bool, OrderError> {
    // Backfill the paid date if payment landed without one
    if order.payment_status == PaymentStatus::Paid && order.paid_at.is_none() {
        order.paid_at = Some(now_millis());
        order.updated_at = now_millis();
        ctx.store.update_order(order).await?;
    }

    // Terminal short-circuit
    if order.order_status.is_terminal() {
        return Ok(false);
    }

    let mut changed = false;

    if order.order_status == OrderStatus::Pending
        && matches!(
            order.payment_status,
            PaymentStatus::Authorized | PaymentStatus::Paid | PaymentStatus::PartiallyPaid
        )
    {
        changed |= set_order_status(ctx, order, OrderStatus::Processing, false, false).await?;
    }

    if order.order_status == OrderStatus::Pending
        && matches!(
            order.shipping_status,
            ShippingStatus::PartiallyShipped | ShippingStatus::Shipped | ShippingStatus::Delivered
        )
    {
        changed |= set_order_status(ctx, order, OrderStatus::Processing, false, false).await?;
    }

    // Completion is only considered for fully paid orders
    if order.payment_status == PaymentStatus::Paid {
        let completed = match order.shipping_status {
            ShippingStatus::ShippingNotRequired | ShippingStatus::Delivered => true,
            ShippingStatus::Shipped => !ctx.settings.order.complete_order_when_delivered,
            _ => false,
        };
        if completed {
            changed |= set_order_status(ctx, order, OrderStatus::Complete, true, false).await?;
        }
    }

    Ok(changed)
}

/// Downstream effects of an order becoming fully paid.
///
/// Shared by placement (zero-total carts), capture, mark-as-paid and
/// partial payments crossing the threshold.
pub async fn process_order_paid(ctx: &CommandContext<'_>, order: &Order) {
    if let Err(e) = ctx.services.messenger.order_paid_customer(order).await {
        tracing::error!(order_code = %order.code, error = %e,
            "failed to send paid-order customer notification");
    }
    if let Err(e) = ctx.services.messenger.order_paid_store_owner(order).await {
        tracing::error!(order_code = %order.code, error = %e,
            "failed to send paid-order store owner notification");
    }
    notify_order_vendors(ctx, order, VendorMessage::Paid).await;
    ctx.publish(OrderSignal::Paid {
        order_id: order.id.clone(),
    });
}
