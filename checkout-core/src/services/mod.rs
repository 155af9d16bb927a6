//! Collaborator contracts
//!
//! Every external side-effect owner the core coordinates — pricing,
//! inventory, gateways, messaging, loyalty, vouchers, reservations,
//! auctions, discounts — behind a narrow async trait. The in-memory
//! recording implementations live in [`memory`].

pub mod gateway;
pub mod memory;

use async_trait::async_trait;
use shared::models::{
    Customer, Discount, GiftVoucher, Product, ShoppingCartItem, Vendor,
};
use shared::order::Order;
use thiserror::Error;

pub use gateway::{
    GatewayError, PaymentGateway, PaymentGateways, PaymentResult, ProcessPaymentRequest,
    RefundRequest,
};

/// Message delivery failure. Always caught and logged by the core,
/// never propagated past a command boundary.
#[derive(Debug, Error)]
#[error("Message delivery failed: {0}")]
pub struct MessageError(pub String);

// ============================================================================
// Pricing aggregator
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct CartSubTotal {
    pub subtotal_excl_tax: f64,
    pub subtotal_incl_tax: f64,
    pub discount_amount: f64,
    pub applied_discounts: Vec<Discount>,
}

#[derive(Debug, Clone, Default)]
pub struct CartShippingTotal {
    pub total_excl_tax: f64,
    pub total_incl_tax: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CartTaxTotal {
    pub total: f64,
    /// Tax amount by rate percent
    pub rates_by_percent: Vec<(f64, f64)>,
}

/// Voucher applied against a cart at checkout
#[derive(Debug, Clone)]
pub struct AppliedGiftVoucher {
    pub voucher_id: String,
    pub amount_used: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CartGrandTotal {
    /// `None` when the total cannot be calculated yet
    pub total: Option<f64>,
    pub discount_amount: f64,
    pub applied_discounts: Vec<Discount>,
    pub applied_gift_vouchers: Vec<AppliedGiftVoucher>,
    pub redeemed_points: i32,
    pub redeemed_points_amount: f64,
}

/// Per-line prices resolved for order-item materialization
#[derive(Debug, Clone, Default)]
pub struct ItemPrices {
    pub unit_excl_tax: f64,
    pub unit_incl_tax: f64,
    pub line_excl_tax: f64,
    pub line_incl_tax: f64,
}

/// Pricing/tax/discount aggregator. Consumed, never reimplemented here.
#[async_trait]
pub trait CartTotals: Send + Sync {
    async fn cart_subtotal(&self, cart: &[ShoppingCartItem], include_tax: bool) -> CartSubTotal;
    /// `None` when the shipping total cannot be calculated
    async fn cart_shipping_total(&self, cart: &[ShoppingCartItem]) -> Option<CartShippingTotal>;
    async fn cart_tax_total(&self, cart: &[ShoppingCartItem]) -> CartTaxTotal;
    async fn cart_total(&self, cart: &[ShoppingCartItem]) -> CartGrandTotal;
    async fn item_prices(&self, item: &ShoppingCartItem) -> ItemPrices;
}

// ============================================================================
// Cart validation outcome + ownership
// ============================================================================

/// Cart-level validation outcomes, delegated to the cart subsystem.
/// Any returned warning aborts placement with a user-facing error.
#[async_trait]
pub trait CartChecks: Send + Sync {
    async fn cart_warnings(
        &self,
        cart: &[ShoppingCartItem],
        checkout_attributes: &str,
    ) -> Vec<String>;
    async fn item_warnings(&self, customer: &Customer, item: &ShoppingCartItem) -> Vec<String>;
    async fn clear_cart(&self, customer_id: &str, store_id: &str);
}

// ============================================================================
// Catalog lookups
// ============================================================================

#[async_trait]
pub trait Catalog: Send + Sync {
    async fn product_by_id(&self, product_id: &str) -> Option<Product>;
    async fn vendor_by_id(&self, vendor_id: &str) -> Option<Vendor>;
}

// ============================================================================
// Inventory reservation
// ============================================================================

/// Reserved-stock adjustment by signed delta.
///
/// Placement passes `-quantity` per item; compensation passes
/// `+(quantity - cancel_qty)`; the item mutation handlers pass the
/// signed delta of their change. The service itself serializes
/// per-product updates.
#[async_trait]
pub trait InventoryReservations: Send + Sync {
    async fn adjust_reserved(
        &self,
        product: &Product,
        delta: i32,
        attributes: &str,
        warehouse_id: Option<&str>,
    );
}

// ============================================================================
// Notifications
// ============================================================================

/// Notification collaborator.
///
/// Each method returns the queued email id; `0` means the template is
/// inactive or missing, which is not an error.
#[async_trait]
pub trait OrderMessenger: Send + Sync {
    async fn order_placed_customer(&self, order: &Order) -> Result<i32, MessageError>;
    async fn order_placed_store_owner(&self, order: &Order) -> Result<i32, MessageError>;
    async fn order_placed_vendor(&self, order: &Order, vendor: &Vendor)
    -> Result<i32, MessageError>;
    async fn order_paid_customer(&self, order: &Order) -> Result<i32, MessageError>;
    async fn order_paid_store_owner(&self, order: &Order) -> Result<i32, MessageError>;
    async fn order_paid_vendor(&self, order: &Order, vendor: &Vendor)
    -> Result<i32, MessageError>;
    async fn order_completed_customer(
        &self,
        order: &Order,
        attach_invoice: bool,
    ) -> Result<i32, MessageError>;
    async fn order_cancelled_customer(&self, order: &Order) -> Result<i32, MessageError>;
    async fn order_cancelled_vendor(
        &self,
        order: &Order,
        vendor: &Vendor,
    ) -> Result<i32, MessageError>;
    async fn order_cancelled_store_owner(
        &self,
        order: &Order,
        vendor: &Vendor,
    ) -> Result<i32, MessageError>;
    async fn order_refunded_customer(
        &self,
        order: &Order,
        amount: f64,
    ) -> Result<i32, MessageError>;
    async fn order_refunded_store_owner(
        &self,
        order: &Order,
        amount: f64,
    ) -> Result<i32, MessageError>;
}

// ============================================================================
// Loyalty points ledger
// ============================================================================

#[async_trait]
pub trait LoyaltyBook: Send + Sync {
    async fn add_points(&self, customer_id: &str, order_id: &str, points: i32, message: &str);
    async fn reduce_points(&self, customer_id: &str, order_id: &str, points: i32, message: &str);
    async fn balance(&self, customer_id: &str) -> i32;
}

// ============================================================================
// Gift voucher ledger
// ============================================================================

#[async_trait]
pub trait GiftVoucherBook: Send + Sync {
    async fn issue(&self, voucher: GiftVoucher);
    /// Record a redemption of `amount` against `order_id`
    async fn redeem(&self, voucher_id: &str, order_id: &str, amount: f64);
    /// Activate every voucher purchased with the order (idempotent)
    async fn activate_purchased(&self, order_id: &str);
    /// Deactivate every voucher purchased with the order (idempotent)
    async fn deactivate_purchased(&self, order_id: &str);
    async fn purchased_by_order(&self, order_id: &str) -> Vec<GiftVoucher>;
    async fn purchased_by_order_item(&self, order_item_id: &str) -> Vec<GiftVoucher>;
}

// ============================================================================
// Reservations, auctions, discounts
// ============================================================================

#[async_trait]
pub trait ReservationBook: Send + Sync {
    /// Promote per-customer holds for `cart_item_id` to order-linked
    /// reservations; returns the number promoted.
    async fn promote_holds(&self, customer_id: &str, order_id: &str, cart_item_id: &str) -> u32;
    async fn cancel_for_order(&self, order_id: &str);
}

#[async_trait]
pub trait AuctionBook: Send + Sync {
    /// Mark the customer's winning bid on the product as settled by the order
    async fn settle_bid(&self, product_id: &str, customer_id: &str, order_id: &str);
    async fn cancel_bids(&self, order_id: &str);
}

#[async_trait]
pub trait DiscountLedger: Send + Sync {
    async fn record_usage(&self, discount: &Discount, order_id: &str);
    async fn cancel_usage(&self, order_id: &str);
}
