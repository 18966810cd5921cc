use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Purchase, PurchaseItem};

/// Simulated payment form. Nothing is charged; only the last four card digits are kept.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub full_name: String,
    pub email: String,
    pub card_number: String,
    /// `MM/YY`.
    pub expiry: String,
    pub cvc: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseWithItems {
    pub purchase: Purchase,
    pub items: Vec<PurchaseItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseList {
    pub items: Vec<Purchase>,
}
