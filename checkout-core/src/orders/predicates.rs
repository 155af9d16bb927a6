//! Capability predicates for the payment transaction state machine
//!
//! Pure functions over (transaction, gateway capabilities). Every
//! gateway-backed or administrative payment operation checks its
//! predicate first and raises a validation error when it fails.

use crate::money;
use crate::services::PaymentGateway;
use shared::order::{PaymentTransaction, TransactionStatus};

pub fn can_capture(transaction: &PaymentTransaction, gateway: &dyn PaymentGateway) -> bool {
    transaction.status == TransactionStatus::Authorized && gateway.supports_capture()
}

pub fn can_mark_as_paid(transaction: &PaymentTransaction) -> bool {
    !matches!(
        transaction.status,
        TransactionStatus::Paid
            | TransactionStatus::Refunded
            | TransactionStatus::PartiallyRefunded
            | TransactionStatus::Voided
            | TransactionStatus::Canceled
    )
}

pub fn can_mark_as_authorized(transaction: &PaymentTransaction) -> bool {
    transaction.status == TransactionStatus::Pending
}

pub fn can_refund(transaction: &PaymentTransaction, gateway: &dyn PaymentGateway) -> bool {
    can_refund_offline(transaction) && gateway.supports_refund()
}

pub fn can_refund_offline(transaction: &PaymentTransaction) -> bool {
    transaction.paid_amount > 0.0 && transaction.status == TransactionStatus::Paid
}

pub fn can_partially_refund(
    transaction: &PaymentTransaction,
    amount: f64,
    gateway: &dyn PaymentGateway,
) -> bool {
    can_partially_refund_offline(transaction, amount) && gateway.supports_partial_refund()
}

pub fn can_partially_refund_offline(transaction: &PaymentTransaction, amount: f64) -> bool {
    transaction.paid_amount > 0.0
        && matches!(
            transaction.status,
            TransactionStatus::Paid | TransactionStatus::PartiallyRefunded
        )
        && amount > 0.0
        && money::gte(
            money::sub(transaction.paid_amount, transaction.refunded_amount),
            amount,
        )
}

pub fn can_void(transaction: &PaymentTransaction, gateway: &dyn PaymentGateway) -> bool {
    transaction.status == TransactionStatus::Authorized && gateway.supports_void()
}

pub fn can_void_offline(transaction: &PaymentTransaction) -> bool {
    matches!(
        transaction.status,
        TransactionStatus::Pending | TransactionStatus::Authorized
    )
}

pub fn can_partially_paid(transaction: &PaymentTransaction, amount: f64) -> bool {
    matches!(
        transaction.status,
        TransactionStatus::Pending | TransactionStatus::PartiallyPaid
    ) && amount > 0.0
        && money::gte(
            transaction.transaction_amount,
            money::add(transaction.paid_amount, amount),
        )
}
