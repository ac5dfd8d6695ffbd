//! Pending Order Model

use serde::{Deserialize, Serialize};

/// One product-quantity-price entry within an order or sale.
///
/// Name and category are snapshotted from the product at the time the
/// line is added, so a later catalog edit cannot rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    pub category_name: String,
    /// Always > 0; a zero-quantity line is rejected at the boundary
    pub quantity: u32,
    /// Unit price in cents
    pub unit_price: i64,
}

impl LineItem {
    /// Subtotal in cents (computed, never stored authoritatively).
    ///
    /// Saturates instead of overflowing; a saturated total can never
    /// match an exact payment split, so the sale is rejected rather
    /// than committed with a wrapped amount.
    pub fn subtotal(&self) -> i64 {
        self.unit_price.saturating_mul(self.quantity as i64)
    }
}

/// The mutable, in-progress order attached to a table before payment.
///
/// One record per table, keyed by `table_id`. Created on the first
/// line-item add, destroyed on finalize or explicit cancel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub table_id: String,
    pub table_name: String,
    pub line_items: Vec<LineItem>,
    /// Epoch milliseconds of the last mutation
    pub last_modified: i64,
}

impl PendingOrder {
    pub fn new(table_id: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            table_name: table_name.into(),
            line_items: Vec::new(),
            last_modified: crate::util::now_millis(),
        }
    }

    /// Order total in cents (saturating, see [`LineItem::subtotal`])
    pub fn total(&self) -> i64 {
        self.line_items
            .iter()
            .fold(0i64, |acc, item| acc.saturating_add(item.subtotal()))
    }

    /// Quantity of a given product held by this order (saturating)
    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.line_items
            .iter()
            .filter(|item| item.product_id == product_id)
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }

    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }
}
