//! Product Model

use serde::{Deserialize, Serialize};

/// Product entity
///
/// Stock is only ever mutated by the sale commit engine (decrement on
/// a committed sale) or by the external inventory module. The category
/// is denormalized onto the product so line items can snapshot it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Category reference (String ID)
    pub category_id: String,
    pub category_name: String,
    /// Units on hand, never negative
    pub stock_quantity: u32,
    /// Cost price in cents
    pub cost_price: i64,
    /// Sale price in cents
    pub sale_price: i64,
}
