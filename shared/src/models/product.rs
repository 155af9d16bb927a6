//! Product snapshot model

use serde::{Deserialize, Serialize};

/// Product as seen by the checkout core
///
/// A narrow read model: only the fields placement and the item mutation
/// handlers consume. Catalog CRUD lives elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub sku: String,
    /// Price in currency unit
    pub price: f64,
    pub published: bool,
    pub requires_shipping: bool,
    pub is_gift_voucher: bool,
    /// Overrides the unit price as the issued voucher amount when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gift_voucher_amount: Option<f64>,
    pub is_reservation: bool,
    pub is_auction: bool,
    /// Products that must accompany this one in the cart
    #[serde(default)]
    pub required_product_ids: Vec<String>,
    /// Auto-add missing required products instead of rejecting the cart
    #[serde(default)]
    pub auto_add_required_products: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<String>,
}
