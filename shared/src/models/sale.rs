//! Sale Model
//!
//! A sale is an immutable point-in-time copy of a finalized order.
//! Once written it is never mutated and keeps no back-reference to the
//! table or products it came from.

use serde::{Deserialize, Serialize};

use super::LineItem;

/// How the total was paid, in cents per method.
///
/// All three fields are always present and default to zero, so a
/// single-method payment is just a split with two zero fields. The
/// invariant `cash + transfer_app + card == total` is enforced before
/// the commit transaction starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSplit {
    #[serde(default)]
    pub cash: i64,
    #[serde(default)]
    pub transfer_app: i64,
    #[serde(default)]
    pub card: i64,
}

impl PaymentSplit {
    pub fn total(&self) -> i64 {
        self.cash + self.transfer_app + self.card
    }
}

/// Sale status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Paid,
}

/// Immutable sale record, created exactly once per finalize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    /// Short human-facing number from a monotonic counter
    pub receipt_number: u64,
    /// Table label current at finalize time
    pub table_label: String,
    /// Snapshot of the finalized line items
    pub line_items: Vec<LineItem>,
    /// Total in cents
    pub total: i64,
    pub payment_split: PaymentSplit,
    pub status: SaleStatus,
    /// Epoch milliseconds of the commit
    pub timestamp: i64,
}
