//! In-memory order store

use super::{OrderStore, StoreError};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared::models::Shipment;
use shared::order::{Order, PaymentTransaction, TransactionStatus};
use std::collections::HashMap;

/// `parking_lot`-backed store for tests, the demo and embedding hosts
/// that bring their own durability.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<String, Order>>,
    transactions: RwLock<HashMap<String, PaymentTransaction>>,
    shipments: RwLock<Vec<Shipment>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order_count(&self) -> usize {
        self.orders.read().len()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        self.orders
            .write()
            .insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn update_order(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write();
        if !orders.contains_key(&order.id) {
            return Err(StoreError::OrderNotFound(order.id.clone()));
        }
        orders.insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn order_by_id(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().get(order_id).cloned())
    }

    async fn order_by_guid(&self, order_guid: &str) -> Result<Option<Order>, StoreError> {
        Ok(self
            .orders
            .read()
            .values()
            .find(|o| o.order_guid == order_guid)
            .cloned())
    }

    async fn insert_transaction(
        &self,
        transaction: &PaymentTransaction,
    ) -> Result<(), StoreError> {
        self.transactions
            .write()
            .insert(transaction.id.clone(), transaction.clone());
        Ok(())
    }

    async fn update_transaction(
        &self,
        transaction: &PaymentTransaction,
    ) -> Result<(), StoreError> {
        let mut transactions = self.transactions.write();
        if !transactions.contains_key(&transaction.id) {
            return Err(StoreError::TransactionNotFound(transaction.id.clone()));
        }
        transactions.insert(transaction.id.clone(), transaction.clone());
        Ok(())
    }

    async fn transaction_by_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<PaymentTransaction>, StoreError> {
        Ok(self.transactions.read().get(transaction_id).cloned())
    }

    async fn transaction_by_order_guid(
        &self,
        order_guid: &str,
    ) -> Result<Option<PaymentTransaction>, StoreError> {
        Ok(self
            .transactions
            .read()
            .values()
            .find(|t| t.order_guid == order_guid)
            .cloned())
    }

    async fn pending_transaction_for(
        &self,
        customer_id: &str,
        store_id: &str,
    ) -> Result<Option<PaymentTransaction>, StoreError> {
        Ok(self
            .transactions
            .read()
            .values()
            .find(|t| {
                t.temp
                    && t.status == TransactionStatus::Pending
                    && t.customer_id == customer_id
                    && t.store_id == store_id
            })
            .cloned())
    }

    async fn shipments_for_order(&self, order_id: &str) -> Result<Vec<Shipment>, StoreError> {
        Ok(self
            .shipments
            .read()
            .iter()
            .filter(|s| s.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn insert_shipment(&self, shipment: &Shipment) -> Result<(), StoreError> {
        self.shipments.write().push(shipment.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_missing_order_fails() {
        let store = MemoryOrderStore::new();
        let order = Order {
            id: "missing".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            store.update_order(&order).await,
            Err(StoreError::OrderNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_pending_transaction_lookup_is_sticky() {
        let store = MemoryOrderStore::new();
        let txn = PaymentTransaction::placeholder("c1", "s1");
        store.insert_transaction(&txn).await.unwrap();

        let found = store.pending_transaction_for("c1", "s1").await.unwrap();
        assert_eq!(found.map(|t| t.id), Some(txn.id.clone()));

        // Finalized placeholders are no longer reusable
        let mut finalized = txn;
        finalized.temp = false;
        store.update_transaction(&finalized).await.unwrap();
        assert!(
            store
                .pending_transaction_for("c1", "s1")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_order_guid_correlation() {
        let store = MemoryOrderStore::new();
        let order = Order {
            id: "o1".to_string(),
            order_guid: "guid-1".to_string(),
            ..Default::default()
        };
        store.insert_order(&order).await.unwrap();
        let found = store.order_by_guid("guid-1").await.unwrap();
        assert_eq!(found.map(|o| o.id), Some("o1".to_string()));
    }
}
