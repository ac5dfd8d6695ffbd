//! Table Model

use serde::{Deserialize, Serialize};

/// Table entity (mesa)
///
/// A table may exist with no pending order. A table with a non-empty
/// pending order cannot be deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
    pub name: String,
}

/// Create table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCreate {
    pub name: String,
}

/// Rename table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRename {
    pub name: String,
}
