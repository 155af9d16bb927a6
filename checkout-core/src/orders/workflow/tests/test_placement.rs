use super::*;
use shared::order::TransactionStatus;

#[tokio::test]
async fn test_place_order_success() {
    let h = harness();
    let (order, transaction) = place_simple_order(&h, 50.0).await;

    assert_eq!(order.order_status, OrderStatus::Complete); // paid + no shipping
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    assert_eq!(order.total, 50.0);
    assert_eq!(order.paid_amount, 50.0);
    assert_eq!(order.code.len(), 8);
    assert!(
        order
            .code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    );

    assert_eq!(transaction.status, TransactionStatus::Paid);
    assert!(!transaction.temp);
    assert_eq!(transaction.order_guid, order.order_guid);
    assert_eq!(transaction.transaction_amount, 50.0);

    // Inventory reserved per item
    assert_eq!(h.inventory.net_delta("p1"), -1);
    // Cart cleared for the customer/store pair
    assert_eq!(
        h.cart_checks.cleared_carts(),
        vec![("customer-1".to_string(), "store-1".to_string())]
    );
}

#[tokio::test]
async fn test_zero_total_skips_gateway() {
    // Scenario A: fully covered cart never reaches the gateway
    let h = harness();
    let (order, transaction) = place_simple_order(&h, 0.0).await;

    assert!(h.gateway.process_calls().is_empty());
    assert_eq!(transaction.status, TransactionStatus::Paid);
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    // check_order_status immediately drives the unshipped order to Complete
    assert_eq!(order.order_status, OrderStatus::Complete);
}

#[tokio::test]
async fn test_gateway_decline_creates_no_order() {
    let h = harness();
    h.catalog.insert_product(test_product("p1", 50.0, false));
    h.totals.script_flat(50.0, 0.0, 50.0);
    *h.gateway.fail_with.write() = Some(vec![
        "card declined".to_string(),
        "insufficient funds".to_string(),
    ]);

    let result = h
        .workflow
        .place_order(test_customer(), vec![cart_line("p1", 1)], test_checkout())
        .await;

    assert!(!result.success());
    assert!(result.order.is_none());
    assert_eq!(result.errors.len(), 2);
    assert_eq!(
        result.errors_joined(),
        "Error 0: card declined; Error 1: insufficient funds"
    );

    // The placeholder transaction recorded the gateway errors and stays
    // reusable for a retry
    let transaction = result.transaction.unwrap();
    assert!(transaction.temp);
    assert_eq!(transaction.errors.len(), 2);

    // No side effects fired
    assert_eq!(h.inventory.calls().len(), 0);
    assert!(h.cart_checks.cleared_carts().is_empty());
    assert_eq!(h.store.order_count(), 0);
}

#[tokio::test]
async fn test_gateway_transport_error_creates_no_order() {
    let h = harness();
    h.catalog.insert_product(test_product("p1", 50.0, false));
    h.totals.script_flat(50.0, 0.0, 50.0);
    *h.gateway.transport_error.write() = Some("connection reset".to_string());

    let result = h
        .workflow
        .place_order(test_customer(), vec![cart_line("p1", 1)], test_checkout())
        .await;

    assert!(!result.success());
    assert!(result.order.is_none());
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("connection reset"));
}

#[tokio::test]
async fn test_placement_retry_reuses_pending_transaction() {
    let h = harness();
    h.catalog.insert_product(test_product("p1", 50.0, false));
    h.totals.script_flat(50.0, 0.0, 50.0);
    *h.gateway.fail_with.write() = Some(vec!["declined".to_string()]);

    let first = h
        .workflow
        .place_order(test_customer(), vec![cart_line("p1", 1)], test_checkout())
        .await;
    let placeholder_id = first.transaction.unwrap().id;

    *h.gateway.fail_with.write() = None;
    let second = h
        .workflow
        .place_order(test_customer(), vec![cart_line("p1", 1)], test_checkout())
        .await;
    assert!(second.success());
    assert_eq!(second.transaction.unwrap().id, placeholder_id);
}

#[tokio::test]
async fn test_guest_blocked_when_anonymous_checkout_disabled() {
    let mut settings = CheckoutSettings::default();
    settings.order.anonymous_checkout_allowed = false;
    let h = harness_with(settings);
    h.catalog.insert_product(test_product("p1", 50.0, false));
    h.totals.script_flat(50.0, 0.0, 50.0);

    let mut customer = test_customer();
    customer.is_guest = true;
    let result = h
        .workflow
        .place_order(customer, vec![cart_line("p1", 1)], test_checkout())
        .await;

    assert!(!result.success());
    assert_eq!(result.errors, vec!["Anonymous checkout is not allowed"]);
}

#[tokio::test]
async fn test_invalid_billing_email_blocks_placement() {
    let h = harness();
    h.catalog.insert_product(test_product("p1", 50.0, false));
    h.totals.script_flat(50.0, 0.0, 50.0);

    let mut customer = test_customer();
    customer.billing_address.as_mut().unwrap().email = "not-an-email".to_string();
    let result = h
        .workflow
        .place_order(customer, vec![cart_line("p1", 1)], test_checkout())
        .await;

    assert!(!result.success());
    assert_eq!(result.errors, vec!["Email is not valid"]);
}

#[tokio::test]
async fn test_missing_shipping_address_blocks_shippable_cart() {
    let h = harness();
    h.catalog.insert_product(test_product("p1", 50.0, true));
    h.totals.script_flat(50.0, 5.0, 55.0);

    let mut customer = test_customer();
    customer.shipping_address = None;
    let result = h
        .workflow
        .place_order(customer, vec![cart_line("p1", 1)], test_checkout())
        .await;

    assert!(!result.success());
    assert_eq!(result.errors, vec!["Shipping address is not provided"]);
}

#[tokio::test]
async fn test_cart_warnings_abort_placement() {
    let h = harness();
    h.catalog.insert_product(test_product("p1", 50.0, false));
    h.totals.script_flat(50.0, 0.0, 50.0);
    h.cart_checks
        .warnings
        .write()
        .push("Product is out of stock".to_string());

    let result = h
        .workflow
        .place_order(test_customer(), vec![cart_line("p1", 1)], test_checkout())
        .await;

    assert!(!result.success());
    assert_eq!(result.errors, vec!["Product is out of stock"]);
    assert_eq!(h.store.order_count(), 0);
}

#[tokio::test]
async fn test_empty_cart_blocks_placement() {
    let h = harness();
    let result = h
        .workflow
        .place_order(test_customer(), vec![], test_checkout())
        .await;
    assert!(!result.success());
    assert_eq!(result.errors, vec!["Cart is empty"]);
}

#[tokio::test]
async fn test_unknown_payment_method_blocks_placement() {
    let h = harness();
    h.catalog.insert_product(test_product("p1", 50.0, false));
    h.totals.script_flat(50.0, 0.0, 50.0);

    let mut checkout = test_checkout();
    checkout.payment_method = "unknown".to_string();
    let result = h
        .workflow
        .place_order(test_customer(), vec![cart_line("p1", 1)], checkout)
        .await;

    assert!(!result.success());
    assert_eq!(result.errors, vec!["Payment method couldn't be loaded"]);
}

#[tokio::test]
async fn test_inactive_payment_method_blocks_placement() {
    let h = harness();
    h.catalog.insert_product(test_product("p1", 50.0, false));
    h.totals.script_flat(50.0, 0.0, 50.0);
    h.gateways.deactivate(PAYMENT_METHOD);

    let result = h
        .workflow
        .place_order(test_customer(), vec![cart_line("p1", 1)], test_checkout())
        .await;

    assert!(!result.success());
    assert_eq!(result.errors, vec!["Payment method is not active"]);
}

#[tokio::test]
async fn test_uncalculable_totals_block_placement() {
    let h = harness();
    h.catalog.insert_product(test_product("p1", 50.0, false));
    h.totals.script_flat(50.0, 0.0, 50.0);
    *h.totals.shipping.write() = None;

    let result = h
        .workflow
        .place_order(test_customer(), vec![cart_line("p1", 1)], test_checkout())
        .await;
    assert!(!result.success());
    assert_eq!(result.errors, vec!["Shipping total couldn't be calculated"]);

    *h.totals.shipping.write() = Some(Default::default());
    h.totals.grand_total.write().total = None;
    let result = h
        .workflow
        .place_order(test_customer(), vec![cart_line("p1", 1)], test_checkout())
        .await;
    assert!(!result.success());
    assert_eq!(result.errors, vec!["Order total couldn't be calculated"]);
}

#[tokio::test]
async fn test_min_order_total_enforced() {
    let mut settings = CheckoutSettings::default();
    settings.order.min_order_total = Some(100.0);
    let h = harness_with(settings);
    h.catalog.insert_product(test_product("p1", 50.0, false));
    h.totals.script_flat(50.0, 0.0, 50.0);

    let result = h
        .workflow
        .place_order(test_customer(), vec![cart_line("p1", 1)], test_checkout())
        .await;
    assert!(!result.success());
    assert_eq!(
        result.errors,
        vec!["Order total is below the minimum of 100"]
    );
}

#[tokio::test]
async fn test_monetary_fields_rounded_to_six_places() {
    let h = harness();
    h.catalog.insert_product(test_product("p1", 33.0, false));
    h.totals
        .script_flat(33.3333333333, 0.0, 33.3333333333);

    let result = h
        .workflow
        .place_order(test_customer(), vec![cart_line("p1", 1)], test_checkout())
        .await;
    let order = result.order.unwrap();
    assert_eq!(order.total, 33.333333);
    assert_eq!(order.subtotal_excl_tax, 33.333333);
}

#[tokio::test]
async fn test_required_products_auto_added() {
    let h = harness();
    let mut main = test_product("p1", 50.0, false);
    main.auto_add_required_products = true;
    main.required_product_ids = vec!["p2".to_string()];
    h.catalog.insert_product(main);
    h.catalog.insert_product(test_product("p2", 5.0, false));
    h.totals.script_flat(55.0, 0.0, 55.0);

    let result = h
        .workflow
        .place_order(test_customer(), vec![cart_line("p1", 1)], test_checkout())
        .await;
    let order = result.order.unwrap();
    assert_eq!(order.items.len(), 2);
    assert!(order.items.iter().any(|i| i.product_id == "p2"));
    assert_eq!(h.inventory.net_delta("p2"), -1);
}

#[tokio::test]
async fn test_required_product_cycle_terminates() {
    // A requires B, B requires A: the already-in-cart check plus the
    // pass bound must terminate with each product present once
    let h = harness();
    let mut a = test_product("pa", 10.0, false);
    a.auto_add_required_products = true;
    a.required_product_ids = vec!["pb".to_string()];
    let mut b = test_product("pb", 10.0, false);
    b.auto_add_required_products = true;
    b.required_product_ids = vec!["pa".to_string()];
    h.catalog.insert_product(a);
    h.catalog.insert_product(b);
    h.totals.script_flat(20.0, 0.0, 20.0);

    let result = h
        .workflow
        .place_order(test_customer(), vec![cart_line("pa", 1)], test_checkout())
        .await;
    let order = result.order.unwrap();
    assert_eq!(order.items.len(), 2);
}

#[tokio::test]
async fn test_gift_voucher_issued_per_unit() {
    let h = harness();
    // Shippable so the order stays in Processing and the vouchers are
    // not yet activated by completion
    let mut product = test_product("pv", 25.0, true);
    product.is_gift_voucher = true;
    h.catalog.insert_product(product);
    h.totals.script_flat(75.0, 0.0, 75.0);
    h.totals.script_item_price(
        "pv",
        ItemPrices {
            unit_excl_tax: 25.0,
            unit_incl_tax: 25.0,
            line_excl_tax: 75.0,
            line_incl_tax: 75.0,
        },
    );

    let result = h
        .workflow
        .place_order(test_customer(), vec![cart_line("pv", 3)], test_checkout())
        .await;
    let order = result.order.unwrap();

    let vouchers = h.vouchers.vouchers();
    assert_eq!(vouchers.len(), 3);
    for voucher in &vouchers {
        assert_eq!(voucher.amount, 25.0);
        assert_eq!(voucher.code.len(), 13);
        assert!(!voucher.activated);
        assert_eq!(
            voucher.purchased_with_order_id.as_deref(),
            Some(order.id.as_str())
        );
    }
}

#[tokio::test]
async fn test_duplicate_product_lines_get_distinct_voucher_links() {
    // Two lines of the same product (distinct attribute selections)
    // must each link to their own order item
    let h = harness();
    let mut product = test_product("pv", 25.0, false);
    product.is_gift_voucher = true;
    h.catalog.insert_product(product);
    h.totals.script_flat(50.0, 0.0, 50.0);

    let mut first = cart_line("pv", 1);
    first.id = "cart-pv-a".to_string();
    first.warehouse_id = Some("wh-a".to_string());
    let mut second = cart_line("pv", 1);
    second.id = "cart-pv-b".to_string();
    second.warehouse_id = Some("wh-b".to_string());

    let result = h
        .workflow
        .place_order(test_customer(), vec![first, second], test_checkout())
        .await;
    let order = result.order.unwrap();
    assert_eq!(order.items.len(), 2);

    let linked: std::collections::HashSet<_> = h
        .vouchers
        .vouchers()
        .iter()
        .filter_map(|v| v.purchased_with_order_item_id.clone())
        .collect();
    let item_ids: std::collections::HashSet<_> =
        order.items.iter().map(|i| i.id.clone()).collect();
    assert_eq!(linked.len(), 2);
    assert_eq!(linked, item_ids);

    // Each line reserves stock against its own warehouse
    let warehouses: Vec<_> = h
        .inventory
        .calls()
        .iter()
        .filter_map(|c| c.warehouse_id.clone())
        .collect();
    assert_eq!(warehouses, vec!["wh-a".to_string(), "wh-b".to_string()]);
}

#[tokio::test]
async fn test_redeemed_points_and_discounts_recorded() {
    let h = harness();
    h.catalog.insert_product(test_product("p1", 90.0, false));
    h.totals.script_flat(100.0, 0.0, 80.0);
    h.totals.script_discounts(
        vec![shared::models::Discount {
            id: "d1".to_string(),
            name: "Ten off".to_string(),
        }],
        10.0,
    );
    h.totals.script_redeemed_points(50, 10.0);

    let result = h
        .workflow
        .place_order(test_customer(), vec![cart_line("p1", 1)], test_checkout())
        .await;
    let order = result.order.unwrap();

    assert_eq!(order.redeemed_points, 50);
    assert_eq!(order.redeemed_points_amount, 10.0);
    assert_eq!(order.applied_discount_ids, vec!["d1".to_string()]);

    // Points deducted from the customer's balance
    let redeemed: Vec<_> = h
        .loyalty
        .entries()
        .into_iter()
        .filter(|e| e.points == -50)
        .collect();
    assert_eq!(redeemed.len(), 1);
    assert_eq!(redeemed[0].order_id, order.id);
    // Usage ledger written
    let usages = h.discounts.usages();
    assert_eq!(usages.len(), 1);
    assert_eq!(usages[0].discount_id, "d1");
    assert!(!usages[0].cancelled);
}

#[tokio::test]
async fn test_placement_signal_published() {
    let h = harness();
    let mut signals = h.workflow.subscribe();
    let (order, _) = place_simple_order(&h, 50.0).await;

    let first = signals.recv().await.unwrap();
    assert_eq!(
        first,
        shared::order::OrderSignal::Placed {
            order_id: order.id.clone()
        }
    );
    // Default gateway pays immediately, so a Paid signal follows
    let second = signals.recv().await.unwrap();
    assert_eq!(
        second,
        shared::order::OrderSignal::Paid {
            order_id: order.id
        }
    );
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_placement() {
    let h = harness();
    *h.messenger.fail_all.write() = true;
    let (order, _) = place_simple_order(&h, 50.0).await;
    assert_eq!(order.payment_status, PaymentStatus::Paid);
}
