//! Persistence seam for orders, transactions and shipments
//!
//! The storage engine is out of scope for this core; everything runs
//! against this trait. [`memory::MemoryOrderStore`] is the reference
//! implementation used by tests and the demo.

pub mod memory;

use async_trait::async_trait;
use shared::models::Shipment;
use shared::order::{Order, PaymentTransaction};
use thiserror::Error;

pub use memory::MemoryOrderStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Storage backend failure: {0}")]
    Backend(String),
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_order(&self, order: &Order) -> Result<(), StoreError>;
    async fn update_order(&self, order: &Order) -> Result<(), StoreError>;
    async fn order_by_id(&self, order_id: &str) -> Result<Option<Order>, StoreError>;
    async fn order_by_guid(&self, order_guid: &str) -> Result<Option<Order>, StoreError>;

    async fn insert_transaction(&self, transaction: &PaymentTransaction)
    -> Result<(), StoreError>;
    async fn update_transaction(&self, transaction: &PaymentTransaction)
    -> Result<(), StoreError>;
    async fn transaction_by_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<PaymentTransaction>, StoreError>;
    async fn transaction_by_order_guid(
        &self,
        order_guid: &str,
    ) -> Result<Option<PaymentTransaction>, StoreError>;
    /// Sticky pending placeholder for `(customer, store)`, reused by
    /// placement retries.
    async fn pending_transaction_for(
        &self,
        customer_id: &str,
        store_id: &str,
    ) -> Result<Option<PaymentTransaction>, StoreError>;

    async fn shipments_for_order(&self, order_id: &str) -> Result<Vec<Shipment>, StoreError>;
    async fn insert_shipment(&self, shipment: &Shipment) -> Result<(), StoreError>;
}
