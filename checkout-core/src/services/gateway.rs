//! Payment gateway adapter contract
//!
//! Gateways report failure two ways: an `Err(GatewayError)` for
//! transport-level trouble, or `Ok(PaymentResult { success: false, .. })`
//! with per-error strings. The core folds both into accumulated error
//! lists and never lets either escape a command handler.

use async_trait::async_trait;
use shared::order::{PaymentTransaction, TransactionStatus};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Payment gateway communication failed: {0}")]
    Transport(String),
}

/// Request for the initial payment at placement time
#[derive(Debug, Clone)]
pub struct ProcessPaymentRequest {
    pub order_guid: String,
    pub order_code: String,
    pub customer_id: String,
    pub store_id: String,
    pub payment_method: String,
    pub amount: f64,
    pub currency_code: String,
}

/// Refund request, used for both full and partial refunds
#[derive(Debug, Clone)]
pub struct RefundRequest {
    pub transaction: PaymentTransaction,
    pub amount: f64,
    pub is_partial: bool,
}

/// Outcome of any gateway operation
#[derive(Debug, Clone)]
pub struct PaymentResult {
    pub success: bool,
    pub new_status: TransactionStatus,
    pub authorization_id: Option<String>,
    pub capture_id: Option<String>,
    pub errors: Vec<String>,
}

impl PaymentResult {
    pub fn succeeded(new_status: TransactionStatus) -> Self {
        Self {
            success: true,
            new_status,
            authorization_id: None,
            capture_id: None,
            errors: Vec::new(),
        }
    }

    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            success: false,
            new_status: TransactionStatus::Pending,
            authorization_id: None,
            capture_id: None,
            errors,
        }
    }
}

/// One payment method implementation
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &str;
    fn supports_capture(&self) -> bool;
    fn supports_refund(&self) -> bool;
    fn supports_partial_refund(&self) -> bool;
    fn supports_void(&self) -> bool;

    async fn process_payment(
        &self,
        request: &ProcessPaymentRequest,
    ) -> Result<PaymentResult, GatewayError>;
    async fn capture(
        &self,
        transaction: &PaymentTransaction,
    ) -> Result<PaymentResult, GatewayError>;
    async fn refund(&self, request: &RefundRequest) -> Result<PaymentResult, GatewayError>;
    async fn void(&self, transaction: &PaymentTransaction)
    -> Result<PaymentResult, GatewayError>;
}

/// Registry of named payment methods
pub trait PaymentGateways: Send + Sync {
    fn by_name(&self, name: &str) -> Option<Arc<dyn PaymentGateway>>;
    fn is_active(&self, name: &str) -> bool;
}
