//! Vendor snapshot model

use serde::{Deserialize, Serialize};

/// Vendor represented among an order's line items
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Vendor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub active: bool,
    pub deleted: bool,
}
