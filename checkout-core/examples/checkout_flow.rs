//! End-to-end checkout walkthrough against the in-memory collaborators.
//!
//! Run with: `cargo run --example checkout_flow`

use checkout_core::services::memory::{
    MemoryAuctionBook, MemoryCartChecks, MemoryCartTotals, MemoryCatalog, MemoryDiscountLedger,
    MemoryGateway, MemoryGateways, MemoryGiftVoucherBook, MemoryInventory, MemoryLoyaltyBook,
    MemoryMessenger, MemoryReservationBook,
};
use checkout_core::services::ItemPrices;
use checkout_core::store::MemoryOrderStore;
use checkout_core::{CheckoutSettings, OrderWorkflow, Services};
use shared::models::{Address, CheckoutContext, Customer, Product, ShoppingCartItem};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let store = Arc::new(MemoryOrderStore::new());
    let catalog = Arc::new(MemoryCatalog::default());
    let totals = Arc::new(MemoryCartTotals::default());
    let gateway = Arc::new(MemoryGateway::new("demo-pay"));
    let gateways = Arc::new(MemoryGateways::default());
    gateways.register(gateway.clone());

    let services = Services {
        catalog: catalog.clone(),
        totals: totals.clone(),
        cart: Arc::new(MemoryCartChecks::default()),
        inventory: Arc::new(MemoryInventory::default()),
        gateways,
        messenger: Arc::new(MemoryMessenger::default()),
        loyalty: Arc::new(MemoryLoyaltyBook::default()),
        vouchers: Arc::new(MemoryGiftVoucherBook::default()),
        reservations: Arc::new(MemoryReservationBook::default()),
        auctions: Arc::new(MemoryAuctionBook::default()),
        discounts: Arc::new(MemoryDiscountLedger::default()),
    };
    let workflow = OrderWorkflow::new(store, services, CheckoutSettings::default());

    let mut signals = workflow.subscribe();
    tokio::spawn(async move {
        while let Ok(signal) = signals.recv().await {
            tracing::info!(?signal, "signal received");
        }
    });

    catalog.insert_product(Product {
        id: "espresso-machine".to_string(),
        name: "Espresso Machine".to_string(),
        sku: "EM-01".to_string(),
        price: 249.0,
        published: true,
        requires_shipping: false,
        ..Default::default()
    });
    totals.script_flat(249.0, 0.0, 249.0);
    totals.script_item_price(
        "espresso-machine",
        ItemPrices {
            unit_excl_tax: 249.0,
            unit_incl_tax: 249.0,
            line_excl_tax: 249.0,
            line_incl_tax: 249.0,
        },
    );

    let address = Address {
        name: "Demo Customer".to_string(),
        email: "demo@example.com".to_string(),
        city: "Lisbon".to_string(),
        address1: "1 Demo Street".to_string(),
        zip: "1000-001".to_string(),
        ..Default::default()
    };
    let customer = Customer {
        id: "demo-customer".to_string(),
        email: "demo@example.com".to_string(),
        active: true,
        language_id: "en".to_string(),
        billing_address: Some(address.clone()),
        shipping_address: Some(address),
        ..Default::default()
    };
    let cart = vec![ShoppingCartItem {
        id: "cart-1".to_string(),
        product_id: "espresso-machine".to_string(),
        quantity: 1,
        ..Default::default()
    }];
    let checkout = CheckoutContext {
        store_id: "demo-store".to_string(),
        store_currency_code: "EUR".to_string(),
        currency_rate: 1.0,
        language_id: "en".to_string(),
        payment_method: "demo-pay".to_string(),
        ..Default::default()
    };

    let result = workflow.place_order(customer, cart, checkout).await;
    let Some(order) = result.order else {
        tracing::error!(errors = %result.errors_joined(), "placement failed");
        return;
    };
    tracing::info!(code = %order.code, total = order.total, status = ?order.order_status,
        "order placed");

    let transaction = result.transaction.unwrap();
    match workflow.partially_refund(&transaction.id, 49.0).await {
        Ok(errors) if errors.is_empty() => {
            tracing::info!(amount = 49.0, "partial refund applied");
        }
        Ok(errors) => tracing::warn!(?errors, "partial refund declined"),
        Err(e) => tracing::warn!(error = %e, "partial refund rejected"),
    }

    let order = workflow.order(&order.id).await.unwrap().unwrap();
    tracing::info!(status = ?order.order_status, payment = ?order.payment_status,
        refunded = order.refunded_amount, "final order state");
    for note in &order.notes {
        tracing::info!(note = %note.text);
    }

    // Let the detached placement notifications land before exiting
    tokio::task::yield_now().await;
}
