//! PlaceOrder command handler
//!
//! The placement orchestrator: validates the customer and cart,
//! computes totals through the pricing aggregator, runs the gateway,
//! materializes the order aggregate and fires the post-commit fan-out
//! (inventory, vouchers, reservations, bids, loyalty, discounts, cart
//! clearing). Never lets an error escape: everything is converted into
//! the result's error list.

use crate::error::OrderError;
use crate::money;
use crate::orders::context::{CommandContext, CommandHandler};
use crate::orders::status;
use crate::services::{CartGrandTotal, ProcessPaymentRequest};
use async_trait::async_trait;
use shared::models::{CheckoutContext, Customer, GiftVoucher, Product, ShoppingCartItem};
use shared::order::{
    Order, OrderItem, OrderSignal, OrderStatus, OrderTax, PaymentStatus, PaymentTransaction,
    ShippingStatus, TransactionStatus,
};
use shared::util::{new_guid, now_millis, random_code};
use validator::ValidateEmail;

/// Bound on required-product auto-add passes; a pathological product
/// graph (A requires B requires A ...) stops here instead of looping.
const REQUIRED_PRODUCT_MAX_DEPTH: usize = 8;

/// Length of gift voucher redemption codes
const VOUCHER_CODE_LENGTH: usize = 13;

/// PlaceOrder action
pub struct PlaceOrderAction {
    pub customer: Customer,
    pub cart: Vec<ShoppingCartItem>,
    pub checkout: CheckoutContext,
}

/// Structured placement outcome
#[derive(Debug, Default)]
pub struct PlaceOrderResult {
    pub order: Option<Order>,
    pub transaction: Option<PaymentTransaction>,
    pub errors: Vec<String>,
}

impl PlaceOrderResult {
    pub fn success(&self) -> bool {
        self.errors.is_empty() && self.order.is_some()
    }

    fn failed(errors: Vec<String>) -> Self {
        Self {
            order: None,
            transaction: None,
            errors,
        }
    }

    /// Display form: `"Error 0: …; Error 1: …"`.
    pub fn errors_joined(&self) -> String {
        self.errors
            .iter()
            .enumerate()
            .map(|(i, e)| format!("Error {i}: {e}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[async_trait]
impl CommandHandler for PlaceOrderAction {
    type Output = PlaceOrderResult;

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<PlaceOrderResult, OrderError> {
        match self.place(ctx).await {
            Ok(result) => Ok(result),
            Err(err) => {
                tracing::warn!(customer_id = %self.customer.id, error = %err,
                    "order placement failed");
                Ok(PlaceOrderResult::failed(vec![err.to_string()]))
            }
        }
    }
}

impl PlaceOrderAction {
    async fn place(&self, ctx: &CommandContext<'_>) -> Result<PlaceOrderResult, OrderError> {
        // 1. Auto-add required products, then validate customer + cart
        let mut cart = self.cart.clone();
        add_required_products(ctx, &mut cart).await;

        let shipping_required = self.cart_requires_shipping(ctx, &cart).await;
        self.validate_customer(ctx, shipping_required)?;
        self.validate_cart(ctx, &cart).await?;

        // 2. Totals via the pricing aggregator
        let subtotal = ctx.services.totals.cart_subtotal(&cart, false).await;
        let subtotal_incl = ctx.services.totals.cart_subtotal(&cart, true).await;
        let shipping = ctx
            .services
            .totals
            .cart_shipping_total(&cart)
            .await
            .ok_or_else(|| OrderError::validation("Shipping total couldn't be calculated"))?;
        let tax = ctx.services.totals.cart_tax_total(&cart).await;
        let grand = ctx.services.totals.cart_total(&cart).await;
        let total = grand
            .total
            .ok_or_else(|| OrderError::validation("Order total couldn't be calculated"))?;

        self.validate_total_bounds(ctx, total)?;

        // 3. Create or reuse the sticky pending transaction
        let order_guid = new_guid();
        let code = random_code(ctx.settings.order.order_code_length);
        let mut transaction = match ctx
            .store
            .pending_transaction_for(&self.customer.id, &self.checkout.store_id)
            .await?
        {
            Some(existing) => existing,
            None => {
                let placeholder =
                    PaymentTransaction::placeholder(&self.customer.id, &self.checkout.store_id);
                ctx.store.insert_transaction(&placeholder).await?;
                placeholder
            }
        };
        transaction.temp = true;
        transaction.order_guid = order_guid.clone();
        transaction.order_code = code.clone();
        transaction.payment_method = self.checkout.payment_method.clone();
        transaction.currency_code = self.currency_code();
        transaction.transaction_amount = money::round(total);
        transaction.updated_at = now_millis();
        ctx.store.update_transaction(&transaction).await?;

        // 4. Gateway, skipped entirely for a zero total
        let payment_status = if money::is_zero(total) {
            TransactionStatus::Paid
        } else {
            match self.run_gateway(ctx, &mut transaction, total, &code, &order_guid).await? {
                Ok(new_status) => new_status,
                Err(errors) => {
                    // No order is created for a failed gateway call,
                    // even one that failed without error strings.
                    ctx.store.update_transaction(&transaction).await?;
                    return Ok(PlaceOrderResult {
                        order: None,
                        transaction: Some(transaction),
                        errors,
                    });
                }
            }
        };

        // 5. Materialize and persist the order aggregate
        let mut order = self
            .build_order(
                ctx,
                &cart,
                code,
                order_guid,
                shipping_required,
                &subtotal,
                &subtotal_incl,
                shipping.total_excl_tax,
                &tax,
                &grand,
                total,
                payment_status,
            )
            .await;
        ctx.store.insert_order(&order).await?;

        // 6. Finalize the transaction against the persisted order
        transaction.temp = false;
        transaction.status = payment_status;
        if payment_status == TransactionStatus::Paid {
            transaction.paid_amount = transaction.transaction_amount;
        }
        transaction.updated_at = now_millis();
        ctx.store.update_transaction(&transaction).await?;

        // 7. Post-commit fan-out
        self.fan_out(ctx, &mut order, &cart, &grand).await?;
        order.add_note("Order placed");
        ctx.store.update_order(&order).await?;

        // 8. Consistency check, signal, detached courtesy notification
        status::check_order_status(ctx, &mut order).await?;
        ctx.publish(OrderSignal::Placed {
            order_id: order.id.clone(),
        });
        self.spawn_placed_notifications(ctx, order.clone());
        if order.payment_status == PaymentStatus::Paid {
            status::process_order_paid(ctx, &order).await;
        }

        tracing::info!(order_code = %order.code, total = order.total, "order placed");

        Ok(PlaceOrderResult {
            order: Some(order),
            transaction: Some(transaction),
            errors: Vec::new(),
        })
    }

    fn currency_code(&self) -> String {
        self.customer
            .currency_code
            .clone()
            .unwrap_or_else(|| self.checkout.store_currency_code.clone())
    }

    fn validate_customer(
        &self,
        ctx: &CommandContext<'_>,
        shipping_required: bool,
    ) -> Result<(), OrderError> {
        let customer = &self.customer;
        if customer.deleted || !customer.active {
            return Err(OrderError::validation("Customer is not active"));
        }
        if customer.is_guest && !ctx.settings.order.anonymous_checkout_allowed {
            return Err(OrderError::validation("Anonymous checkout is not allowed"));
        }

        let billing = customer
            .billing_address
            .as_ref()
            .ok_or_else(|| OrderError::validation("Billing address is not provided"))?;
        if !billing.email.validate_email() {
            return Err(OrderError::validation("Email is not valid"));
        }
        if let Some(country) = &billing.country {
            if !country.allows_billing {
                return Err(OrderError::validation(format!(
                    "Country '{}' is not allowed for billing",
                    country.name
                )));
            }
        }

        if shipping_required {
            let shipping = customer
                .shipping_address
                .as_ref()
                .ok_or_else(|| OrderError::validation("Shipping address is not provided"))?;
            if !shipping.email.validate_email() {
                return Err(OrderError::validation("Email is not valid"));
            }
            if let Some(country) = &shipping.country {
                if !country.allows_shipping {
                    return Err(OrderError::validation(format!(
                        "Country '{}' is not allowed for shipping",
                        country.name
                    )));
                }
            }
        }
        Ok(())
    }

    async fn validate_cart(
        &self,
        ctx: &CommandContext<'_>,
        cart: &[ShoppingCartItem],
    ) -> Result<(), OrderError> {
        if cart.is_empty() {
            return Err(OrderError::validation("Cart is empty"));
        }
        let warnings = ctx
            .services
            .cart
            .cart_warnings(cart, &self.checkout.checkout_attributes)
            .await;
        if !warnings.is_empty() {
            return Err(OrderError::Validation(warnings.join("; ")));
        }
        for item in cart {
            let warnings = ctx.services.cart.item_warnings(&self.customer, item).await;
            if !warnings.is_empty() {
                return Err(OrderError::Validation(warnings.join("; ")));
            }
        }
        Ok(())
    }

    fn validate_total_bounds(
        &self,
        ctx: &CommandContext<'_>,
        total: f64,
    ) -> Result<(), OrderError> {
        if let Some(min) = ctx.settings.order.min_order_total {
            if total < min {
                return Err(OrderError::validation(format!(
                    "Order total is below the minimum of {min}"
                )));
            }
        }
        if let Some(max) = ctx.settings.order.max_order_total {
            if total > max {
                return Err(OrderError::validation(format!(
                    "Order total is above the maximum of {max}"
                )));
            }
        }
        Ok(())
    }

    async fn cart_requires_shipping(
        &self,
        ctx: &CommandContext<'_>,
        cart: &[ShoppingCartItem],
    ) -> bool {
        for item in cart {
            if let Some(product) = ctx.services.catalog.product_by_id(&item.product_id).await {
                if product.requires_shipping {
                    return true;
                }
            }
        }
        false
    }

    /// Run the named gateway. `Ok(Ok(status))` on success, `Ok(Err(errors))`
    /// when the gateway declined or the transport failed.
    async fn run_gateway(
        &self,
        ctx: &CommandContext<'_>,
        transaction: &mut PaymentTransaction,
        total: f64,
        order_code: &str,
        order_guid: &str,
    ) -> Result<Result<TransactionStatus, Vec<String>>, OrderError> {
        let method = &self.checkout.payment_method;
        let gateway = ctx
            .services
            .gateways
            .by_name(method)
            .ok_or_else(|| OrderError::validation("Payment method couldn't be loaded"))?;
        if !ctx.services.gateways.is_active(method) {
            return Err(OrderError::validation("Payment method is not active"));
        }

        let request = ProcessPaymentRequest {
            order_guid: order_guid.to_string(),
            order_code: order_code.to_string(),
            customer_id: self.customer.id.clone(),
            store_id: self.checkout.store_id.clone(),
            payment_method: method.clone(),
            amount: money::round(total),
            currency_code: self.currency_code(),
        };

        match gateway.process_payment(&request).await {
            Ok(result) if result.success => {
                transaction.authorization_id = result.authorization_id;
                transaction.capture_id = result.capture_id;
                Ok(Ok(result.new_status))
            }
            Ok(result) => {
                transaction.errors.extend(result.errors.clone());
                tracing::error!(order_code = %order_code,
                    error = %result.errors.join("; "), "gateway declined payment");
                Ok(Err(result.errors))
            }
            Err(e) => {
                let message = e.to_string();
                transaction.errors.push(message.clone());
                tracing::error!(order_code = %order_code, error = %message,
                    "gateway call failed");
                Ok(Err(vec![message]))
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn build_order(
        &self,
        ctx: &CommandContext<'_>,
        cart: &[ShoppingCartItem],
        code: String,
        order_guid: String,
        shipping_required: bool,
        subtotal: &crate::services::CartSubTotal,
        subtotal_incl: &crate::services::CartSubTotal,
        shipping_total: f64,
        tax: &crate::services::CartTaxTotal,
        grand: &CartGrandTotal,
        total: f64,
        payment_status: TransactionStatus,
    ) -> Order {
        let now = now_millis();
        let billing = self.customer.billing_address.clone().unwrap_or_default();

        let mut order = Order {
            id: new_guid(),
            code,
            order_guid,
            customer_id: self.customer.id.clone(),
            store_id: self.checkout.store_id.clone(),
            currency_code: self.currency_code(),
            currency_rate: self.checkout.currency_rate,
            language_id: self.checkout.language_id.clone(),
            billing_address: billing,
            shipping_address: if shipping_required {
                self.customer.shipping_address.clone()
            } else {
                None
            },
            shipping_required,
            payment_method: self.checkout.payment_method.clone(),
            checkout_attributes: self.checkout.checkout_attributes.clone(),
            taxes: tax
                .rates_by_percent
                .iter()
                .map(|(rate, amount)| OrderTax {
                    rate: *rate,
                    amount: money::round(*amount),
                })
                .collect(),
            subtotal_excl_tax: money::round(subtotal.subtotal_excl_tax),
            subtotal_incl_tax: money::round(subtotal_incl.subtotal_incl_tax),
            discount_amount: money::round(grand.discount_amount),
            shipping_total: money::round(shipping_total),
            tax_total: money::round(tax.total),
            total: money::round(total),
            order_status: OrderStatus::Pending,
            payment_status: match payment_status {
                TransactionStatus::Paid => PaymentStatus::Paid,
                TransactionStatus::Authorized => PaymentStatus::Authorized,
                _ => PaymentStatus::Pending,
            },
            shipping_status: if shipping_required {
                ShippingStatus::NotYetShipped
            } else {
                ShippingStatus::ShippingNotRequired
            },
            redeemed_points: grand.redeemed_points,
            redeemed_points_amount: money::round(grand.redeemed_points_amount),
            applied_discount_ids: grand
                .applied_discounts
                .iter()
                .map(|d| d.id.clone())
                .collect(),
            created_at: now,
            updated_at: now,
            paid_at: (payment_status == TransactionStatus::Paid).then_some(now),
            ..Default::default()
        };
        if order.payment_status == PaymentStatus::Paid {
            order.paid_amount = order.total;
        }

        // Move cart items to order items
        for cart_item in cart {
            let Some(product) = ctx
                .services
                .catalog
                .product_by_id(&cart_item.product_id)
                .await
            else {
                continue;
            };
            let prices = ctx.services.totals.item_prices(cart_item).await;
            order.items.push(OrderItem {
                id: new_guid(),
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                quantity: cart_item.quantity,
                open_qty: cart_item.quantity,
                cancel_qty: 0,
                unit_price_excl_tax: money::round(prices.unit_excl_tax),
                unit_price_incl_tax: money::round(prices.unit_incl_tax),
                line_total_excl_tax: money::round(prices.line_excl_tax),
                line_total_incl_tax: money::round(prices.line_incl_tax),
                attributes: cart_item.attributes.clone(),
                warehouse_id: cart_item
                    .warehouse_id
                    .clone()
                    .or_else(|| product.warehouse_id.clone()),
                vendor_id: product.vendor_id.clone(),
                is_shippable: product.requires_shipping,
                status: Default::default(),
            });
        }

        order
    }

    /// The dependent workflows fired once the order exists.
    async fn fan_out(
        &self,
        ctx: &CommandContext<'_>,
        order: &mut Order,
        cart: &[ShoppingCartItem],
        grand: &CartGrandTotal,
    ) -> Result<(), OrderError> {
        // Order items were materialized in cart order with the same
        // missing-product skip, so cart lines pair with items by
        // position. A product_id lookup would conflate two lines of
        // the same product.
        let mut item_index = 0;
        for cart_item in cart {
            let Some(product) = ctx
                .services
                .catalog
                .product_by_id(&cart_item.product_id)
                .await
            else {
                continue;
            };
            let Some(order_item) = order.items.get(item_index).cloned() else {
                break;
            };
            item_index += 1;

            // Reserve stock
            ctx.services
                .inventory
                .adjust_reserved(
                    &product,
                    -cart_item.quantity,
                    &cart_item.attributes,
                    order_item.warehouse_id.as_deref(),
                )
                .await;

            // Issue one voucher per purchased unit
            if product.is_gift_voucher {
                for _ in 0..cart_item.quantity {
                    ctx.services
                        .vouchers
                        .issue(new_voucher(&product, order, &order_item))
                        .await;
                }
            }

            // Promote reservation holds to the order
            if product.is_reservation {
                let promoted = ctx
                    .services
                    .reservations
                    .promote_holds(&self.customer.id, &order.id, &cart_item.id)
                    .await;
                tracing::debug!(order_code = %order.code, product_id = %product.id,
                    promoted, "promoted reservation holds");
            }

            // Settle the winning auction bid
            if product.is_auction {
                ctx.services
                    .auctions
                    .settle_bid(&product.id, &self.customer.id, &order.id)
                    .await;
            }
        }

        // Deduct redeemed loyalty points
        if grand.redeemed_points > 0 {
            ctx.services
                .loyalty
                .reduce_points(
                    &self.customer.id,
                    &order.id,
                    grand.redeemed_points,
                    &format!("Redeemed points for order {}", order.code),
                )
                .await;
        }

        // Usage ledgers
        for discount in &grand.applied_discounts {
            ctx.services.discounts.record_usage(discount, &order.id).await;
        }
        for applied in &grand.applied_gift_vouchers {
            ctx.services
                .vouchers
                .redeem(&applied.voucher_id, &order.id, applied.amount_used)
                .await;
        }

        ctx.services
            .cart
            .clear_cart(&self.customer.id, &self.checkout.store_id)
            .await;

        Ok(())
    }

    /// Detached courtesy notification: customer, store owner and active
    /// vendors. Runs on its own task with cloned data; failures are
    /// logged and never reach the placement result.
    fn spawn_placed_notifications(&self, ctx: &CommandContext<'_>, order: Order) {
        let messenger = ctx.services.messenger.clone();
        let catalog = ctx.services.catalog.clone();
        tokio::spawn(async move {
            if let Err(e) = messenger.order_placed_customer(&order).await {
                tracing::error!(order_code = %order.code, error = %e,
                    "failed to send placed-order customer notification");
            }
            if let Err(e) = messenger.order_placed_store_owner(&order).await {
                tracing::error!(order_code = %order.code, error = %e,
                    "failed to send placed-order store owner notification");
            }
            for vendor_id in order.vendor_ids() {
                let Some(vendor) = catalog.vendor_by_id(&vendor_id).await else {
                    continue;
                };
                if !vendor.active || vendor.deleted {
                    continue;
                }
                if let Err(e) = messenger.order_placed_vendor(&order, &vendor).await {
                    tracing::error!(order_code = %order.code, vendor_id = %vendor.id,
                        error = %e, "failed to send placed-order vendor notification");
                }
            }
        });
    }
}

fn new_voucher(product: &Product, order: &Order, order_item: &OrderItem) -> GiftVoucher {
    let billing = &order.billing_address;
    GiftVoucher {
        id: new_guid(),
        code: random_code(VOUCHER_CODE_LENGTH),
        amount: money::round(
            product
                .gift_voucher_amount
                .unwrap_or(order_item.unit_price_excl_tax),
        ),
        currency_code: order.currency_code.clone(),
        activated: false,
        recipient_name: billing.name.clone(),
        recipient_email: billing.email.clone(),
        sender_name: billing.name.clone(),
        sender_email: billing.email.clone(),
        message: None,
        notified: false,
        purchased_with_order_id: Some(order.id.clone()),
        purchased_with_order_item_id: Some(order_item.id.clone()),
        usage: Vec::new(),
    }
}

/// Auto-add required products to the cart.
///
/// Idempotent: a product already in the cart is never added twice. Each
/// pass may uncover new requirements; passes are bounded by
/// `REQUIRED_PRODUCT_MAX_DEPTH`.
async fn add_required_products(ctx: &CommandContext<'_>, cart: &mut Vec<ShoppingCartItem>) {
    for _ in 0..REQUIRED_PRODUCT_MAX_DEPTH {
        let mut missing: Vec<String> = Vec::new();
        for item in cart.iter() {
            let Some(product) = ctx.services.catalog.product_by_id(&item.product_id).await
            else {
                continue;
            };
            if !product.auto_add_required_products {
                continue;
            }
            for required_id in &product.required_product_ids {
                let in_cart = cart.iter().any(|i| &i.product_id == required_id)
                    || missing.contains(required_id);
                if !in_cart {
                    missing.push(required_id.clone());
                }
            }
        }
        if missing.is_empty() {
            return;
        }
        for product_id in missing {
            let Some(product) = ctx.services.catalog.product_by_id(&product_id).await else {
                continue;
            };
            if !product.published {
                continue;
            }
            cart.push(ShoppingCartItem {
                id: new_guid(),
                product_id,
                quantity: 1,
                attributes: String::new(),
                warehouse_id: product.warehouse_id.clone(),
            });
        }
    }
}
