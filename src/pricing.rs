//! Cart totals and promo-code discounts.
//!
//! All amounts are integer minor units (cents).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One product entry in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    /// Product identifier. Unique within a cart.
    pub id: Uuid,
    pub title: String,
    pub unit_price: i64,
    pub discounted_unit_price: Option<i64>,
    pub quantity: i32,
    pub product_type: Option<String>,
    pub is_bundle: Option<bool>,
}

impl CartLine {
    /// Discounted price if set, otherwise list price.
    pub fn effective_unit_price(&self) -> i64 {
        self.discounted_unit_price.unwrap_or(self.unit_price)
    }

    pub fn line_total(&self) -> i64 {
        self.effective_unit_price() * i64::from(self.quantity)
    }

    /// Savings against the list price. Zero when no discount applies.
    pub fn line_savings(&self) -> i64 {
        match self.discounted_unit_price {
            Some(discounted) if discounted < self.unit_price => {
                (self.unit_price - discounted) * i64::from(self.quantity)
            }
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Totals {
    pub item_count: i64,
    pub subtotal: i64,
    /// Savings already reflected in `subtotal`; reported for display only.
    pub line_discount: i64,
}

pub fn compute_totals(lines: &[CartLine]) -> Totals {
    lines.iter().fold(Totals::default(), |acc, line| Totals {
        item_count: acc.item_count + i64::from(line.quantity),
        subtotal: acc.subtotal + line.line_total(),
        line_discount: acc.line_discount + line.line_savings(),
    })
}

/// Never negative.
pub fn grand_total(subtotal: i64, promo_discount: i64) -> i64 {
    (subtotal - promo_discount).max(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PromoApplication {
    pub is_valid: bool,
    pub discount_amount: i64,
}

impl PromoApplication {
    pub const INVALID: Self = Self {
        is_valid: false,
        discount_amount: 0,
    };
}

/// Fixed lookup of promo code to percentage off the subtotal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoTable {
    codes: BTreeMap<String, u8>,
}

impl Default for PromoTable {
    fn default() -> Self {
        let codes = [("WELCOME10", 10), ("SAVE20", 20), ("TEMPLATE50", 50)]
            .into_iter()
            .map(|(code, pct)| (code.to_string(), pct))
            .collect();
        Self { codes }
    }
}

impl PromoTable {
    /// Built-in codes plus `extra`. An extra code with a built-in name overrides it.
    pub fn with_codes(extra: impl IntoIterator<Item = (String, u8)>) -> Self {
        let mut table = Self::default();
        table.codes.extend(extra);
        table
    }

    /// Exact, case-sensitive lookup.
    pub fn percentage(&self, code: &str) -> Option<u8> {
        self.codes.get(code).copied()
    }

    pub fn apply(&self, code: &str, subtotal: i64) -> PromoApplication {
        match self.percentage(code) {
            Some(pct) => PromoApplication {
                is_valid: true,
                discount_amount: percent_of(subtotal, pct),
            },
            None => PromoApplication::INVALID,
        }
    }
}

/// `apply_promo_code` against the built-in table.
pub fn apply_promo_code(code: &str, subtotal: i64) -> PromoApplication {
    PromoTable::default().apply(code, subtotal)
}

/// `amount * pct / 100`, rounded half-up to the cent.
fn percent_of(amount: i64, pct: u8) -> i64 {
    (amount * i64::from(pct) + 50).div_euclid(100)
}
