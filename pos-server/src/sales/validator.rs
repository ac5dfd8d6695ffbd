//! Stock reservation validator - the advisory check
//!
//! Answers "can this table take N more units of product P?" by
//! subtracting every *other* table's pending reservations from the
//! cached stock. The answer can be stale the instant it returns,
//! because other tables mutate concurrently with no coordination at
//! this layer. It exists for immediate operator feedback; the safety
//! boundary is the commit engine's in-transaction re-check.

use crate::catalog::CatalogService;
use crate::db::PosStorage;
use crate::sales::SaleError;
use serde::Serialize;

/// Result of an advisory check
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Reservation {
    /// Whether the requested quantity fits the advisory availability
    pub ok: bool,
    /// Stock minus other tables' in-flight reservations
    pub available: u32,
}

/// Advisory validator over the catalog cache and the pending-order store
#[derive(Clone)]
pub struct StockValidator {
    storage: PosStorage,
    catalog: CatalogService,
}

impl StockValidator {
    pub fn new(storage: PosStorage, catalog: CatalogService) -> Self {
        Self { storage, catalog }
    }

    /// Check whether `requested` units of `product_id` are satisfiable
    /// for the table `excluding_table`, given stock minus what every
    /// other table's pending order already holds.
    ///
    /// `excluding_table` is excluded because its own held quantity is
    /// what the caller is about to replace, not a competing claim.
    pub fn check_reservable(
        &self,
        product_id: &str,
        requested: u32,
        excluding_table: &str,
    ) -> Result<Reservation, SaleError> {
        let product = self
            .catalog
            .lookup(product_id)
            .ok_or_else(|| SaleError::ProductNotFound(product_id.to_string()))?;

        let reserved: u32 = self
            .storage
            .list_pending_orders()?
            .iter()
            .filter(|order| order.table_id != excluding_table)
            .map(|order| order.quantity_of(product_id))
            .sum();

        let available = product.stock_quantity.saturating_sub(reserved);
        Ok(Reservation {
            ok: requested <= available,
            available,
        })
    }
}
