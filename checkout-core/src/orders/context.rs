//! Command context and handler trait

use crate::error::OrderError;
use crate::services::{
    AuctionBook, CartChecks, CartTotals, Catalog, DiscountLedger, GiftVoucherBook,
    InventoryReservations, LoyaltyBook, OrderMessenger, PaymentGateways, ReservationBook,
};
use crate::settings::CheckoutSettings;
use crate::store::OrderStore;
use async_trait::async_trait;
use shared::order::{Order, OrderSignal, PaymentTransaction};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Collaborator bundle shared by every command
#[derive(Clone)]
pub struct Services {
    pub catalog: Arc<dyn Catalog>,
    pub totals: Arc<dyn CartTotals>,
    pub cart: Arc<dyn CartChecks>,
    pub inventory: Arc<dyn InventoryReservations>,
    pub gateways: Arc<dyn PaymentGateways>,
    pub messenger: Arc<dyn OrderMessenger>,
    pub loyalty: Arc<dyn LoyaltyBook>,
    pub vouchers: Arc<dyn GiftVoucherBook>,
    pub reservations: Arc<dyn ReservationBook>,
    pub auctions: Arc<dyn AuctionBook>,
    pub discounts: Arc<dyn DiscountLedger>,
}

/// Borrowed execution environment for one command
pub struct CommandContext<'a> {
    pub store: &'a dyn OrderStore,
    pub services: &'a Services,
    pub settings: &'a CheckoutSettings,
    pub signals: &'a broadcast::Sender<OrderSignal>,
}

impl CommandContext<'_> {
    /// Best-effort broadcast; a missing subscriber is not an error.
    pub fn publish(&self, signal: OrderSignal) {
        let _ = self.signals.send(signal);
    }

    pub async fn order(&self, order_id: &str) -> Result<Order, OrderError> {
        self.store
            .order_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }

    pub async fn transaction(
        &self,
        transaction_id: &str,
    ) -> Result<PaymentTransaction, OrderError> {
        self.store
            .transaction_by_id(transaction_id)
            .await?
            .ok_or_else(|| OrderError::TransactionNotFound(transaction_id.to_string()))
    }

    /// The order a transaction is correlated to through its GUID.
    pub async fn order_for_transaction(
        &self,
        transaction: &PaymentTransaction,
    ) -> Result<Order, OrderError> {
        self.store
            .order_by_guid(&transaction.order_guid)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(transaction.order_guid.clone()))
    }
}

/// One command implementation
#[async_trait]
pub trait CommandHandler {
    type Output;

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<Self::Output, OrderError>;
}
