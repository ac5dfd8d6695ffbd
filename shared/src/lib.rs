//! Shared types for the Barra POS backend
//!
//! Domain models used by the server and any front end (via API):
//! products, pending orders, immutable sales and payment splits.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    LineItem, PaymentSplit, PendingOrder, Product, Sale, SaleStatus, Table, TableCreate,
    TableRename,
};
