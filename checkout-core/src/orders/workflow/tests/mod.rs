use super::OrderWorkflow;
use crate::orders::items::ItemCommandOutcome;
use crate::services::memory::{
    MemoryAuctionBook, MemoryCartChecks, MemoryCartTotals, MemoryCatalog, MemoryDiscountLedger,
    MemoryGateway, MemoryGateways, MemoryGiftVoucherBook, MemoryInventory, MemoryLoyaltyBook,
    MemoryMessenger, MemoryReservationBook,
};
use crate::services::ItemPrices;
use crate::settings::CheckoutSettings;
use crate::store::MemoryOrderStore;
use crate::Services;
use shared::models::{Address, CheckoutContext, Customer, Product, ShoppingCartItem};
use shared::order::{Order, OrderStatus, PaymentStatus, PaymentTransaction, ShippingStatus};
use std::sync::Arc;

mod test_compensation;
mod test_placement;

pub const PAYMENT_METHOD: &str = "test-pay";

/// Workflow plus handles on every recording double
pub struct Harness {
    pub workflow: OrderWorkflow,
    pub store: Arc<MemoryOrderStore>,
    pub catalog: Arc<MemoryCatalog>,
    pub totals: Arc<MemoryCartTotals>,
    pub cart_checks: Arc<MemoryCartChecks>,
    pub inventory: Arc<MemoryInventory>,
    pub gateway: Arc<MemoryGateway>,
    pub gateways: Arc<MemoryGateways>,
    pub messenger: Arc<MemoryMessenger>,
    pub loyalty: Arc<MemoryLoyaltyBook>,
    pub vouchers: Arc<MemoryGiftVoucherBook>,
    pub reservations: Arc<MemoryReservationBook>,
    pub auctions: Arc<MemoryAuctionBook>,
    pub discounts: Arc<MemoryDiscountLedger>,
}

pub fn harness() -> Harness {
    harness_with(CheckoutSettings::default())
}

pub fn harness_with(settings: CheckoutSettings) -> Harness {
    let store = Arc::new(MemoryOrderStore::new());
    let catalog = Arc::new(MemoryCatalog::default());
    let totals = Arc::new(MemoryCartTotals::default());
    let cart_checks = Arc::new(MemoryCartChecks::default());
    let inventory = Arc::new(MemoryInventory::default());
    let gateway = Arc::new(MemoryGateway::new(PAYMENT_METHOD));
    let gateways = Arc::new(MemoryGateways::default());
    gateways.register(gateway.clone());
    let messenger = Arc::new(MemoryMessenger::default());
    let loyalty = Arc::new(MemoryLoyaltyBook::default());
    let vouchers = Arc::new(MemoryGiftVoucherBook::default());
    let reservations = Arc::new(MemoryReservationBook::default());
    let auctions = Arc::new(MemoryAuctionBook::default());
    let discounts = Arc::new(MemoryDiscountLedger::default());

    let services = Services {
        catalog: catalog.clone(),
        totals: totals.clone(),
        cart: cart_checks.clone(),
        inventory: inventory.clone(),
        gateways: gateways.clone(),
        messenger: messenger.clone(),
        loyalty: loyalty.clone(),
        vouchers: vouchers.clone(),
        reservations: reservations.clone(),
        auctions: auctions.clone(),
        discounts: discounts.clone(),
    };
    let workflow = OrderWorkflow::new(store.clone(), services, settings);

    Harness {
        workflow,
        store,
        catalog,
        totals,
        cart_checks,
        inventory,
        gateway,
        gateways,
        messenger,
        loyalty,
        vouchers,
        reservations,
        auctions,
        discounts,
    }
}

pub fn test_customer() -> Customer {
    Customer {
        id: "customer-1".to_string(),
        email: "jo@example.com".to_string(),
        is_guest: false,
        active: true,
        deleted: false,
        currency_code: None,
        language_id: "en".to_string(),
        billing_address: Some(test_address()),
        shipping_address: Some(test_address()),
    }
}

pub fn test_address() -> Address {
    Address {
        name: "Jo Tester".to_string(),
        email: "jo@example.com".to_string(),
        city: "Lisbon".to_string(),
        address1: "1 Test Street".to_string(),
        zip: "1000-001".to_string(),
        ..Default::default()
    }
}

pub fn test_checkout() -> CheckoutContext {
    CheckoutContext {
        store_id: "store-1".to_string(),
        store_currency_code: "EUR".to_string(),
        currency_rate: 1.0,
        language_id: "en".to_string(),
        payment_method: PAYMENT_METHOD.to_string(),
        checkout_attributes: String::new(),
    }
}

pub fn test_product(id: &str, price: f64, requires_shipping: bool) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Product {id}"),
        sku: format!("SKU-{id}"),
        price,
        published: true,
        requires_shipping,
        ..Default::default()
    }
}

pub fn cart_line(product_id: &str, quantity: i32) -> ShoppingCartItem {
    ShoppingCartItem {
        id: format!("cart-{product_id}"),
        product_id: product_id.to_string(),
        quantity,
        attributes: String::new(),
        warehouse_id: None,
    }
}

/// Seed one non-shippable product, script flat totals and place an
/// order for it. Returns the placed order and its transaction.
pub async fn place_simple_order(h: &Harness, total: f64) -> (Order, PaymentTransaction) {
    h.catalog.insert_product(test_product("p1", total, false));
    h.totals.script_flat(total, 0.0, total);
    h.totals.script_item_price(
        "p1",
        ItemPrices {
            unit_excl_tax: total,
            unit_incl_tax: total,
            line_excl_tax: total,
            line_incl_tax: total,
        },
    );
    let result = h
        .workflow
        .place_order(test_customer(), vec![cart_line("p1", 1)], test_checkout())
        .await;
    assert!(result.success(), "placement failed: {}", result.errors_joined());
    (result.order.unwrap(), result.transaction.unwrap())
}

/// Insert an order directly into the store, bypassing placement.
pub async fn seed_order(h: &Harness, order: Order) -> Order {
    use crate::store::OrderStore;
    h.store.insert_order(&order).await.unwrap();
    order
}

pub fn pending_order(id: &str) -> Order {
    Order {
        id: id.to_string(),
        code: format!("CODE{id}"),
        order_guid: format!("guid-{id}"),
        customer_id: "customer-1".to_string(),
        store_id: "store-1".to_string(),
        currency_code: "EUR".to_string(),
        currency_rate: 1.0,
        order_status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
        shipping_status: ShippingStatus::NotYetShipped,
        ..Default::default()
    }
}
