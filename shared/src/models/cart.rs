//! Shopping cart and checkout context snapshots

use serde::{Deserialize, Serialize};

/// One line of a customer's shopping cart
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShoppingCartItem {
    pub id: String,
    pub product_id: String,
    pub quantity: i32,
    /// Selected attribute combination, serialized by the cart layer
    #[serde(default)]
    pub attributes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<String>,
}

/// Per-request checkout context resolved by the caller
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CheckoutContext {
    pub store_id: String,
    pub store_currency_code: String,
    pub currency_rate: f64,
    pub language_id: String,
    pub payment_method: String,
    /// Checkout attributes, serialized by the cart layer
    #[serde(default)]
    pub checkout_attributes: String,
}
