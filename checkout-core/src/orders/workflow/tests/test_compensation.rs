use super::*;
use crate::error::OrderError;
use crate::services::LoyaltyBook;
use crate::store::OrderStore;
use shared::models::{Bid, GiftVoucher, Shipment, Vendor};
use shared::order::{OrderSignal, TransactionStatus};

fn shipment_for(order_id: &str) -> Shipment {
    Shipment {
        id: "s1".to_string(),
        order_id: order_id.to_string(),
        items: Vec::new(),
        shipped_at: None,
        delivered_at: None,
        tracking_number: None,
    }
}

#[tokio::test]
async fn test_cancel_reverses_placement_effects() {
    let h = harness();
    let (order, _) = place_simple_order(&h, 50.0).await;
    assert_eq!(h.inventory.net_delta("p1"), -1);

    h.workflow.cancel_order(&order.id, true, true).await.unwrap();

    // Reserved stock released: the net delta is back to zero
    assert_eq!(h.inventory.net_delta("p1"), 0);

    let stored = h.workflow.order(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.order_status, OrderStatus::Cancelled);
    assert!(stored
        .notes
        .iter()
        .any(|n| n.text == "Order has been cancelled"));
    for item in &stored.items {
        assert_eq!(item.cancel_qty, item.quantity);
        assert_eq!(item.open_qty, 0);
        assert_eq!(item.open_qty + item.cancel_qty, item.quantity);
    }
    assert_eq!(h.messenger.sent("cancelled_customer"), 1);
    assert!(stored
        .notes
        .iter()
        .any(|n| n.text == "\"Order cancelled\" email (to store owner) has been queued"));
}

#[tokio::test]
async fn test_cancel_notifies_store_owner_per_vendor() {
    let h = harness();
    h.catalog.insert_vendor(Vendor {
        id: "v1".to_string(),
        name: "Vendor One".to_string(),
        email: "v1@example.com".to_string(),
        active: true,
        deleted: false,
    });
    let mut product = test_product("p1", 50.0, false);
    product.vendor_id = Some("v1".to_string());
    h.catalog.insert_product(product);
    h.totals.script_flat(50.0, 0.0, 50.0);
    let result = h
        .workflow
        .place_order(test_customer(), vec![cart_line("p1", 1)], test_checkout())
        .await;
    let order = result.order.unwrap();

    h.workflow.cancel_order(&order.id, false, true).await.unwrap();

    assert_eq!(h.messenger.sent("cancelled_store_owner"), 1);
    // The store-owner flag alone does not message the customer
    assert_eq!(h.messenger.sent("cancelled_customer"), 0);
    assert_eq!(h.messenger.sent("cancelled_vendor"), 0);
    let stored = h.workflow.order(&order.id).await.unwrap().unwrap();
    assert!(stored
        .notes
        .iter()
        .any(|n| n.text == "\"Order cancelled\" email (to store owner) has been queued"));
}

#[tokio::test]
async fn test_cancel_blocked_by_shipments() {
    let h = harness();
    let (order, _) = place_simple_order(&h, 50.0).await;
    h.store.insert_shipment(&shipment_for(&order.id)).await.unwrap();

    let err = h
        .workflow
        .cancel_order(&order.id, false, false)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Validation(m)
        if m.contains("shipments exist")));

    let stored = h.workflow.order(&order.id).await.unwrap().unwrap();
    assert_ne!(stored.order_status, OrderStatus::Cancelled);
    assert_eq!(h.inventory.net_delta("p1"), -1);
}

#[tokio::test]
async fn test_cancel_twice_rejected() {
    let h = harness();
    let (order, _) = place_simple_order(&h, 50.0).await;
    h.workflow.cancel_order(&order.id, false, false).await.unwrap();

    let err = h
        .workflow
        .cancel_order(&order.id, false, false)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Validation(m)
        if m == "Order is already cancelled"));
    // Inventory stays settled, not released twice
    assert_eq!(h.inventory.net_delta("p1"), 0);
}

#[tokio::test]
async fn test_cancel_returns_redeemed_points() {
    let h = harness();
    h.catalog.insert_product(test_product("p1", 80.0, false));
    h.totals.script_flat(80.0, 0.0, 80.0);
    h.totals.script_redeemed_points(50, 10.0);
    let result = h
        .workflow
        .place_order(test_customer(), vec![cart_line("p1", 1)], test_checkout())
        .await;
    let order = result.order.unwrap();

    h.workflow.cancel_order(&order.id, false, false).await.unwrap();

    // Redeemed points returned, awarded points taken back
    assert_eq!(h.loyalty.balance("customer-1").await, 0);
    assert!(h
        .loyalty
        .entries()
        .iter()
        .any(|e| e.points == 50 && e.order_id == order.id));
}

#[tokio::test]
async fn test_cancel_abandons_outstanding_transaction() {
    let h = harness();
    *h.gateway.process_status.write() = TransactionStatus::Authorized;
    let (order, transaction) = place_simple_order(&h, 50.0).await;

    h.workflow.cancel_order(&order.id, false, false).await.unwrap();

    let transaction = h
        .workflow
        .transaction(&transaction.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(transaction.status, TransactionStatus::Canceled);
}

#[tokio::test]
async fn test_cancel_leaves_paid_transaction_alone() {
    let h = harness();
    let (order, transaction) = place_simple_order(&h, 50.0).await;

    h.workflow.cancel_order(&order.id, false, false).await.unwrap();

    let transaction = h
        .workflow
        .transaction(&transaction.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(transaction.status, TransactionStatus::Paid);
}

#[tokio::test]
async fn test_cancel_reverts_ledgers() {
    let h = harness();
    let mut auction = test_product("pa", 120.0, false);
    auction.is_auction = true;
    h.catalog.insert_product(auction);
    h.auctions.insert_bid(Bid {
        id: "b1".to_string(),
        product_id: "pa".to_string(),
        customer_id: "customer-1".to_string(),
        amount: 120.0,
        order_id: None,
        won: false,
    });
    h.totals.script_flat(120.0, 0.0, 110.0);
    h.totals.script_discounts(
        vec![shared::models::Discount {
            id: "d1".to_string(),
            name: "Ten off".to_string(),
        }],
        10.0,
    );

    let result = h
        .workflow
        .place_order(test_customer(), vec![cart_line("pa", 1)], test_checkout())
        .await;
    let order = result.order.unwrap();
    assert!(h.auctions.bids()[0].won);
    assert!(!h.discounts.usages()[0].cancelled);

    h.workflow.cancel_order(&order.id, false, false).await.unwrap();

    assert!(!h.auctions.bids()[0].won);
    assert!(h.auctions.bids()[0].order_id.is_none());
    assert!(h.discounts.usages()[0].cancelled);
}

#[tokio::test]
async fn test_cancel_publishes_signal() {
    let h = harness();
    let (order, _) = place_simple_order(&h, 50.0).await;
    let mut signals = h.workflow.subscribe();

    h.workflow.cancel_order(&order.id, false, false).await.unwrap();
    assert_eq!(
        signals.recv().await.unwrap(),
        OrderSignal::Cancelled {
            order_id: order.id.clone()
        }
    );
}

#[tokio::test]
async fn test_delete_reverses_effects_for_live_order() {
    let h = harness();
    let (order, _) = place_simple_order(&h, 50.0).await;

    h.workflow.delete_order(&order.id).await.unwrap();

    assert_eq!(h.inventory.net_delta("p1"), 0);
    let stored = h.workflow.order(&order.id).await.unwrap().unwrap();
    assert!(stored.deleted);
    assert!(stored
        .notes
        .iter()
        .any(|n| n.text == "Order has been deleted"));
    for item in &stored.items {
        assert_eq!(item.open_qty, 0);
        assert_eq!(item.cancel_qty, item.quantity);
    }
}

#[tokio::test]
async fn test_delete_after_cancel_only_flags() {
    // A cancelled order was already compensated; deletion must not
    // release inventory a second time
    let h = harness();
    let (order, _) = place_simple_order(&h, 50.0).await;
    h.workflow.cancel_order(&order.id, false, false).await.unwrap();
    let calls_after_cancel = h.inventory.calls().len();

    h.workflow.delete_order(&order.id).await.unwrap();

    assert_eq!(h.inventory.calls().len(), calls_after_cancel);
    assert_eq!(h.inventory.net_delta("p1"), 0);
    let stored = h.workflow.order(&order.id).await.unwrap().unwrap();
    assert!(stored.deleted);
    assert_eq!(stored.order_status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_delete_blocked_by_shipments() {
    let h = harness();
    let (order, _) = place_simple_order(&h, 50.0).await;
    h.store.insert_shipment(&shipment_for(&order.id)).await.unwrap();

    let err = h.workflow.delete_order(&order.id).await.unwrap_err();
    assert!(matches!(err, OrderError::Validation(m)
        if m.contains("shipments exist")));
    let stored = h.workflow.order(&order.id).await.unwrap().unwrap();
    assert!(!stored.deleted);
}

#[tokio::test]
async fn test_delete_deactivates_vouchers_when_configured() {
    let mut settings = CheckoutSettings::default();
    settings.order.deactivate_gift_vouchers_on_delete = true;
    let h = harness_with(settings);
    let (order, _) = place_simple_order(&h, 50.0).await;
    h.vouchers.insert(GiftVoucher {
        id: "v1".to_string(),
        activated: true,
        purchased_with_order_id: Some(order.id.clone()),
        ..Default::default()
    });

    h.workflow.delete_order(&order.id).await.unwrap();
    assert!(!h.vouchers.vouchers()[0].activated);
}

#[tokio::test]
async fn test_unknown_order_raises() {
    let h = harness();
    let err = h
        .workflow
        .cancel_order("no-such-order", false, false)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::OrderNotFound(_)));
}
