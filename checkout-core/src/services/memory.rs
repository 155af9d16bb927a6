//! In-memory collaborator implementations
//!
//! Recording doubles used by the test suites and the demo example.
//! Each one keeps a call log behind a `parking_lot` lock so assertions
//! can inspect exactly what the core asked its collaborators to do.

use super::gateway::{
    GatewayError, PaymentGateway, PaymentGateways, PaymentResult, ProcessPaymentRequest,
    RefundRequest,
};
use super::{
    AppliedGiftVoucher, AuctionBook, CartChecks, CartGrandTotal, CartShippingTotal, CartSubTotal,
    CartTaxTotal, CartTotals, Catalog, DiscountLedger, GiftVoucherBook, InventoryReservations,
    ItemPrices, LoyaltyBook, MessageError, OrderMessenger, ReservationBook,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared::models::{
    Bid, Customer, Discount, DiscountUsage, GiftVoucher, Product, ProductReservation,
    ReservationHold, ShoppingCartItem, Vendor,
};
use shared::order::{Order, TransactionStatus};
use shared::util::now_millis;
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// Catalog
// ============================================================================

#[derive(Default)]
pub struct MemoryCatalog {
    products: RwLock<HashMap<String, Product>>,
    vendors: RwLock<HashMap<String, Vendor>>,
}

impl MemoryCatalog {
    pub fn insert_product(&self, product: Product) {
        self.products.write().insert(product.id.clone(), product);
    }

    pub fn insert_vendor(&self, vendor: Vendor) {
        self.vendors.write().insert(vendor.id.clone(), vendor);
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn product_by_id(&self, product_id: &str) -> Option<Product> {
        self.products.read().get(product_id).cloned()
    }

    async fn vendor_by_id(&self, vendor_id: &str) -> Option<Vendor> {
        self.vendors.read().get(vendor_id).cloned()
    }
}

// ============================================================================
// Pricing aggregator
// ============================================================================

/// Scriptable pricing aggregator: tests set the responses they need.
pub struct MemoryCartTotals {
    pub subtotal: RwLock<CartSubTotal>,
    /// `None` simulates "shipping total couldn't be calculated"
    pub shipping: RwLock<Option<CartShippingTotal>>,
    pub tax: RwLock<CartTaxTotal>,
    pub grand_total: RwLock<CartGrandTotal>,
    /// Per-product item prices; falls back to quantity × product price 0.0
    item_prices: RwLock<HashMap<String, ItemPrices>>,
}

impl Default for MemoryCartTotals {
    fn default() -> Self {
        Self {
            subtotal: RwLock::new(CartSubTotal::default()),
            shipping: RwLock::new(Some(CartShippingTotal::default())),
            tax: RwLock::new(CartTaxTotal::default()),
            grand_total: RwLock::new(CartGrandTotal {
                total: Some(0.0),
                ..Default::default()
            }),
            item_prices: RwLock::new(HashMap::new()),
        }
    }
}

impl MemoryCartTotals {
    /// Script a simple taxless cart: one total for everything.
    pub fn script_flat(&self, subtotal: f64, shipping: f64, total: f64) {
        *self.subtotal.write() = CartSubTotal {
            subtotal_excl_tax: subtotal,
            subtotal_incl_tax: subtotal,
            ..Default::default()
        };
        *self.shipping.write() = Some(CartShippingTotal {
            total_excl_tax: shipping,
            total_incl_tax: shipping,
        });
        self.grand_total.write().total = Some(total);
    }

    pub fn script_item_price(&self, product_id: &str, prices: ItemPrices) {
        self.item_prices
            .write()
            .insert(product_id.to_string(), prices);
    }

    pub fn script_vouchers(&self, vouchers: Vec<AppliedGiftVoucher>) {
        self.grand_total.write().applied_gift_vouchers = vouchers;
    }

    pub fn script_discounts(&self, discounts: Vec<Discount>, amount: f64) {
        let mut grand = self.grand_total.write();
        grand.applied_discounts = discounts;
        grand.discount_amount = amount;
    }

    pub fn script_redeemed_points(&self, points: i32, amount: f64) {
        let mut grand = self.grand_total.write();
        grand.redeemed_points = points;
        grand.redeemed_points_amount = amount;
    }
}

#[async_trait]
impl CartTotals for MemoryCartTotals {
    async fn cart_subtotal(&self, _cart: &[ShoppingCartItem], _include_tax: bool) -> CartSubTotal {
        self.subtotal.read().clone()
    }

    async fn cart_shipping_total(&self, _cart: &[ShoppingCartItem]) -> Option<CartShippingTotal> {
        self.shipping.read().clone()
    }

    async fn cart_tax_total(&self, _cart: &[ShoppingCartItem]) -> CartTaxTotal {
        self.tax.read().clone()
    }

    async fn cart_total(&self, _cart: &[ShoppingCartItem]) -> CartGrandTotal {
        self.grand_total.read().clone()
    }

    async fn item_prices(&self, item: &ShoppingCartItem) -> ItemPrices {
        self.item_prices
            .read()
            .get(&item.product_id)
            .cloned()
            .unwrap_or_default()
    }
}

// ============================================================================
// Cart checks
// ============================================================================

#[derive(Default)]
pub struct MemoryCartChecks {
    pub warnings: RwLock<Vec<String>>,
    pub item_warnings: RwLock<Vec<String>>,
    cleared: RwLock<Vec<(String, String)>>,
}

impl MemoryCartChecks {
    pub fn cleared_carts(&self) -> Vec<(String, String)> {
        self.cleared.read().clone()
    }
}

#[async_trait]
impl CartChecks for MemoryCartChecks {
    async fn cart_warnings(
        &self,
        _cart: &[ShoppingCartItem],
        _checkout_attributes: &str,
    ) -> Vec<String> {
        self.warnings.read().clone()
    }

    async fn item_warnings(&self, _customer: &Customer, _item: &ShoppingCartItem) -> Vec<String> {
        self.item_warnings.read().clone()
    }

    async fn clear_cart(&self, customer_id: &str, store_id: &str) {
        self.cleared
            .write()
            .push((customer_id.to_string(), store_id.to_string()));
    }
}

// ============================================================================
// Inventory
// ============================================================================

#[derive(Debug, Clone)]
pub struct InventoryCall {
    pub product_id: String,
    pub delta: i32,
    pub warehouse_id: Option<String>,
}

#[derive(Default)]
pub struct MemoryInventory {
    calls: RwLock<Vec<InventoryCall>>,
}

impl MemoryInventory {
    pub fn calls(&self) -> Vec<InventoryCall> {
        self.calls.read().clone()
    }

    /// Net reserved-stock delta across every call for the product.
    pub fn net_delta(&self, product_id: &str) -> i32 {
        self.calls
            .read()
            .iter()
            .filter(|c| c.product_id == product_id)
            .map(|c| c.delta)
            .sum()
    }
}

#[async_trait]
impl InventoryReservations for MemoryInventory {
    async fn adjust_reserved(
        &self,
        product: &Product,
        delta: i32,
        _attributes: &str,
        warehouse_id: Option<&str>,
    ) {
        self.calls.write().push(InventoryCall {
            product_id: product.id.clone(),
            delta,
            warehouse_id: warehouse_id.map(str::to_string),
        });
    }
}

// ============================================================================
// Payment gateway
// ============================================================================

/// Scriptable gateway. Defaults to a capture-style method that succeeds
/// every operation with the obvious status.
pub struct MemoryGateway {
    name: String,
    pub supports_capture: bool,
    pub supports_refund: bool,
    pub supports_partial_refund: bool,
    pub supports_void: bool,
    /// Status returned by a successful `process_payment`
    pub process_status: RwLock<TransactionStatus>,
    /// Scripted failure for the next gateway calls
    pub fail_with: RwLock<Option<Vec<String>>>,
    /// Scripted transport error
    pub transport_error: RwLock<Option<String>>,
    process_calls: RwLock<Vec<ProcessPaymentRequest>>,
}

impl MemoryGateway {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supports_capture: true,
            supports_refund: true,
            supports_partial_refund: true,
            supports_void: true,
            process_status: RwLock::new(TransactionStatus::Paid),
            fail_with: RwLock::new(None),
            transport_error: RwLock::new(None),
            process_calls: RwLock::new(Vec::new()),
        }
    }

    pub fn process_calls(&self) -> Vec<ProcessPaymentRequest> {
        self.process_calls.read().clone()
    }

    fn scripted_failure(&self) -> Option<Result<PaymentResult, GatewayError>> {
        if let Some(message) = self.transport_error.read().clone() {
            return Some(Err(GatewayError::Transport(message)));
        }
        if let Some(errors) = self.fail_with.read().clone() {
            return Some(Ok(PaymentResult::failed(errors)));
        }
        None
    }
}

#[async_trait]
impl PaymentGateway for MemoryGateway {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_capture(&self) -> bool {
        self.supports_capture
    }

    fn supports_refund(&self) -> bool {
        self.supports_refund
    }

    fn supports_partial_refund(&self) -> bool {
        self.supports_partial_refund
    }

    fn supports_void(&self) -> bool {
        self.supports_void
    }

    async fn process_payment(
        &self,
        request: &ProcessPaymentRequest,
    ) -> Result<PaymentResult, GatewayError> {
        self.process_calls.write().push(request.clone());
        if let Some(outcome) = self.scripted_failure() {
            return outcome;
        }
        let status = *self.process_status.read();
        let mut result = PaymentResult::succeeded(status);
        match status {
            TransactionStatus::Authorized => {
                result.authorization_id = Some(format!("auth-{}", request.order_code));
            }
            TransactionStatus::Paid => {
                result.capture_id = Some(format!("cap-{}", request.order_code));
            }
            _ => {}
        }
        Ok(result)
    }

    async fn capture(
        &self,
        transaction: &shared::order::PaymentTransaction,
    ) -> Result<PaymentResult, GatewayError> {
        if let Some(outcome) = self.scripted_failure() {
            return outcome;
        }
        let mut result = PaymentResult::succeeded(TransactionStatus::Paid);
        result.capture_id = Some(format!("cap-{}", transaction.order_code));
        Ok(result)
    }

    async fn refund(&self, request: &RefundRequest) -> Result<PaymentResult, GatewayError> {
        if let Some(outcome) = self.scripted_failure() {
            return outcome;
        }
        let refunded = request.transaction.refunded_amount + request.amount;
        let status = if refunded + crate::money::MONEY_TOLERANCE
            >= request.transaction.transaction_amount
        {
            TransactionStatus::Refunded
        } else {
            TransactionStatus::PartiallyRefunded
        };
        Ok(PaymentResult::succeeded(status))
    }

    async fn void(
        &self,
        _transaction: &shared::order::PaymentTransaction,
    ) -> Result<PaymentResult, GatewayError> {
        if let Some(outcome) = self.scripted_failure() {
            return outcome;
        }
        Ok(PaymentResult::succeeded(TransactionStatus::Voided))
    }
}

/// Registry backed by a map plus an active-method set
#[derive(Default)]
pub struct MemoryGateways {
    gateways: RwLock<HashMap<String, Arc<dyn PaymentGateway>>>,
    inactive: RwLock<Vec<String>>,
}

impl MemoryGateways {
    pub fn register(&self, gateway: Arc<dyn PaymentGateway>) {
        self.gateways
            .write()
            .insert(gateway.name().to_string(), gateway);
    }

    pub fn deactivate(&self, name: &str) {
        self.inactive.write().push(name.to_string());
    }
}

impl PaymentGateways for MemoryGateways {
    fn by_name(&self, name: &str) -> Option<Arc<dyn PaymentGateway>> {
        self.gateways.read().get(name).cloned()
    }

    fn is_active(&self, name: &str) -> bool {
        self.gateways.read().contains_key(name) && !self.inactive.read().iter().any(|n| n == name)
    }
}

// ============================================================================
// Messenger
// ============================================================================

/// Counts every message kind; optionally fails all sends so tests can
/// prove notification failures never fail the owning command.
#[derive(Default)]
pub struct MemoryMessenger {
    counts: RwLock<HashMap<&'static str, u32>>,
    pub fail_all: RwLock<bool>,
}

impl MemoryMessenger {
    pub fn sent(&self, kind: &str) -> u32 {
        self.counts.read().get(kind).copied().unwrap_or(0)
    }

    fn record(&self, kind: &'static str) -> Result<i32, MessageError> {
        if *self.fail_all.read() {
            return Err(MessageError(format!("scripted failure for {kind}")));
        }
        let mut counts = self.counts.write();
        let count = counts.entry(kind).or_insert(0);
        *count += 1;
        Ok(*count as i32)
    }
}

#[async_trait]
impl OrderMessenger for MemoryMessenger {
    async fn order_placed_customer(&self, _order: &Order) -> Result<i32, MessageError> {
        self.record("placed_customer")
    }

    async fn order_placed_store_owner(&self, _order: &Order) -> Result<i32, MessageError> {
        self.record("placed_store_owner")
    }

    async fn order_placed_vendor(
        &self,
        _order: &Order,
        _vendor: &Vendor,
    ) -> Result<i32, MessageError> {
        self.record("placed_vendor")
    }

    async fn order_paid_customer(&self, _order: &Order) -> Result<i32, MessageError> {
        self.record("paid_customer")
    }

    async fn order_paid_store_owner(&self, _order: &Order) -> Result<i32, MessageError> {
        self.record("paid_store_owner")
    }

    async fn order_paid_vendor(
        &self,
        _order: &Order,
        _vendor: &Vendor,
    ) -> Result<i32, MessageError> {
        self.record("paid_vendor")
    }

    async fn order_completed_customer(
        &self,
        _order: &Order,
        _attach_invoice: bool,
    ) -> Result<i32, MessageError> {
        self.record("completed_customer")
    }

    async fn order_cancelled_customer(&self, _order: &Order) -> Result<i32, MessageError> {
        self.record("cancelled_customer")
    }

    async fn order_cancelled_vendor(
        &self,
        _order: &Order,
        _vendor: &Vendor,
    ) -> Result<i32, MessageError> {
        self.record("cancelled_vendor")
    }

    async fn order_cancelled_store_owner(
        &self,
        _order: &Order,
        _vendor: &Vendor,
    ) -> Result<i32, MessageError> {
        self.record("cancelled_store_owner")
    }

    async fn order_refunded_customer(
        &self,
        _order: &Order,
        _amount: f64,
    ) -> Result<i32, MessageError> {
        self.record("refunded_customer")
    }

    async fn order_refunded_store_owner(
        &self,
        _order: &Order,
        _amount: f64,
    ) -> Result<i32, MessageError> {
        self.record("refunded_store_owner")
    }
}

// ============================================================================
// Loyalty book
// ============================================================================

#[derive(Debug, Clone)]
pub struct LoyaltyEntry {
    pub customer_id: String,
    pub order_id: String,
    /// Signed: negative for reductions
    pub points: i32,
    pub message: String,
}

#[derive(Default)]
pub struct MemoryLoyaltyBook {
    entries: RwLock<Vec<LoyaltyEntry>>,
}

impl MemoryLoyaltyBook {
    pub fn entries(&self) -> Vec<LoyaltyEntry> {
        self.entries.read().clone()
    }
}

#[async_trait]
impl LoyaltyBook for MemoryLoyaltyBook {
    async fn add_points(&self, customer_id: &str, order_id: &str, points: i32, message: &str) {
        self.entries.write().push(LoyaltyEntry {
            customer_id: customer_id.to_string(),
            order_id: order_id.to_string(),
            points,
            message: message.to_string(),
        });
    }

    async fn reduce_points(&self, customer_id: &str, order_id: &str, points: i32, message: &str) {
        self.entries.write().push(LoyaltyEntry {
            customer_id: customer_id.to_string(),
            order_id: order_id.to_string(),
            points: -points,
            message: message.to_string(),
        });
    }

    async fn balance(&self, customer_id: &str) -> i32 {
        self.entries
            .read()
            .iter()
            .filter(|e| e.customer_id == customer_id)
            .map(|e| e.points)
            .sum()
    }
}

// ============================================================================
// Gift voucher book
// ============================================================================

#[derive(Default)]
pub struct MemoryGiftVoucherBook {
    vouchers: RwLock<Vec<GiftVoucher>>,
}

impl MemoryGiftVoucherBook {
    pub fn vouchers(&self) -> Vec<GiftVoucher> {
        self.vouchers.read().clone()
    }

    pub fn insert(&self, voucher: GiftVoucher) {
        self.vouchers.write().push(voucher);
    }
}

#[async_trait]
impl GiftVoucherBook for MemoryGiftVoucherBook {
    async fn issue(&self, voucher: GiftVoucher) {
        self.vouchers.write().push(voucher);
    }

    async fn redeem(&self, voucher_id: &str, order_id: &str, amount: f64) {
        let mut vouchers = self.vouchers.write();
        if let Some(voucher) = vouchers.iter_mut().find(|v| v.id == voucher_id) {
            voucher.usage.push(shared::models::GiftVoucherUsage {
                order_id: order_id.to_string(),
                amount_used: amount,
                used_at: now_millis(),
            });
        }
    }

    async fn activate_purchased(&self, order_id: &str) {
        for voucher in self.vouchers.write().iter_mut() {
            if voucher.purchased_with_order_id.as_deref() == Some(order_id) {
                voucher.activated = true;
            }
        }
    }

    async fn deactivate_purchased(&self, order_id: &str) {
        for voucher in self.vouchers.write().iter_mut() {
            if voucher.purchased_with_order_id.as_deref() == Some(order_id) {
                voucher.activated = false;
            }
        }
    }

    async fn purchased_by_order(&self, order_id: &str) -> Vec<GiftVoucher> {
        self.vouchers
            .read()
            .iter()
            .filter(|v| v.purchased_with_order_id.as_deref() == Some(order_id))
            .cloned()
            .collect()
    }

    async fn purchased_by_order_item(&self, order_item_id: &str) -> Vec<GiftVoucher> {
        self.vouchers
            .read()
            .iter()
            .filter(|v| v.purchased_with_order_item_id.as_deref() == Some(order_item_id))
            .cloned()
            .collect()
    }
}

// ============================================================================
// Reservation book
// ============================================================================

#[derive(Default)]
pub struct MemoryReservationBook {
    holds: RwLock<Vec<ReservationHold>>,
    reservations: RwLock<Vec<ProductReservation>>,
}

impl MemoryReservationBook {
    pub fn insert_hold(&self, hold: ReservationHold, reservation: ProductReservation) {
        self.holds.write().push(hold);
        self.reservations.write().push(reservation);
    }

    pub fn reservations(&self) -> Vec<ProductReservation> {
        self.reservations.read().clone()
    }
}

#[async_trait]
impl ReservationBook for MemoryReservationBook {
    async fn promote_holds(&self, customer_id: &str, order_id: &str, cart_item_id: &str) -> u32 {
        let mut holds = self.holds.write();
        let mut reservations = self.reservations.write();
        let mut promoted = 0;
        holds.retain(|hold| {
            if hold.customer_id == customer_id && hold.cart_item_id == cart_item_id {
                if let Some(reservation) = reservations
                    .iter_mut()
                    .find(|r| r.id == hold.reservation_id)
                {
                    reservation.order_id = Some(order_id.to_string());
                }
                promoted += 1;
                false
            } else {
                true
            }
        });
        promoted
    }

    async fn cancel_for_order(&self, order_id: &str) {
        for reservation in self.reservations.write().iter_mut() {
            if reservation.order_id.as_deref() == Some(order_id) {
                reservation.order_id = None;
            }
        }
    }
}

// ============================================================================
// Auction book
// ============================================================================

#[derive(Default)]
pub struct MemoryAuctionBook {
    bids: RwLock<Vec<Bid>>,
}

impl MemoryAuctionBook {
    pub fn insert_bid(&self, bid: Bid) {
        self.bids.write().push(bid);
    }

    pub fn bids(&self) -> Vec<Bid> {
        self.bids.read().clone()
    }
}

#[async_trait]
impl AuctionBook for MemoryAuctionBook {
    async fn settle_bid(&self, product_id: &str, customer_id: &str, order_id: &str) {
        for bid in self.bids.write().iter_mut() {
            if bid.product_id == product_id && bid.customer_id == customer_id {
                bid.order_id = Some(order_id.to_string());
                bid.won = true;
            }
        }
    }

    async fn cancel_bids(&self, order_id: &str) {
        for bid in self.bids.write().iter_mut() {
            if bid.order_id.as_deref() == Some(order_id) {
                bid.order_id = None;
                bid.won = false;
            }
        }
    }
}

// ============================================================================
// Discount ledger
// ============================================================================

#[derive(Default)]
pub struct MemoryDiscountLedger {
    usages: RwLock<Vec<DiscountUsage>>,
}

impl MemoryDiscountLedger {
    pub fn usages(&self) -> Vec<DiscountUsage> {
        self.usages.read().clone()
    }
}

#[async_trait]
impl DiscountLedger for MemoryDiscountLedger {
    async fn record_usage(&self, discount: &Discount, order_id: &str) {
        self.usages.write().push(DiscountUsage {
            discount_id: discount.id.clone(),
            order_id: order_id.to_string(),
            created_at: now_millis(),
            cancelled: false,
        });
    }

    async fn cancel_usage(&self, order_id: &str) {
        for usage in self.usages.write().iter_mut() {
            if usage.order_id == order_id {
                usage.cancelled = true;
            }
        }
    }
}
