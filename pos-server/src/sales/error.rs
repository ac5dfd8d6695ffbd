//! Sale error taxonomy
//!
//! Every terminal error identifies the offending product and the
//! shortfall where one exists; callers never receive a bare "failed".

use crate::db::StorageError;
use thiserror::Error;

/// Errors from the reservation validator, the commit engine and the
/// table session manager.
#[derive(Debug, Error)]
pub enum SaleError {
    /// The catalog has no such product (advisory path)
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The product disappeared between validation and commit
    #[error("Product vanished during commit: {0}")]
    ProductVanished(String),

    /// Requested quantity exceeds the authoritative stock
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: u32,
        requested: u32,
    },

    /// Payment split does not sum to the order total (exact, no tolerance)
    #[error("Payment split sums to {paid} but the order total is {total}")]
    PaymentMismatch { paid: i64, total: i64 },

    /// Negative component in the payment split
    #[error("Invalid payment split: {0}")]
    InvalidPayment(String),

    /// Zero/negative quantity or negative unit price
    #[error("Invalid line item: {0}")]
    InvalidLineItem(String),

    /// Finalize on an order with no line items
    #[error("Sale has no line items")]
    EmptySale,

    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Delete refused while a non-empty pending order exists
    #[error("Table has a non-empty pending order: {0}")]
    TableNotEmpty(String),

    /// Line-item edit/remove on a product the order does not hold
    #[error("Line item not found: {0}")]
    LineItemNotFound(String),

    /// Commit retry budget exhausted; nothing was applied
    #[error("Commit aborted after {attempts} conflicting attempts")]
    CommitConflict { attempts: u32 },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),
}
