//! Customer snapshot model

use super::Address;
use serde::{Deserialize, Serialize};

/// Customer as seen by the checkout core
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Customer {
    pub id: String,
    pub email: String,
    pub is_guest: bool,
    pub active: bool,
    pub deleted: bool,
    /// Active currency; falls back to the store default when `None`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    pub language_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<Address>,
}
