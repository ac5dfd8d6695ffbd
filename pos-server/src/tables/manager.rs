//! TableSessionManager - table lifecycle and pending-order editing
//!
//! Owns every UI-level operation: table create/rename/delete, line-item
//! add/edit/remove, cancel, finalize. Each line-item mutation runs its
//! advisory stock check first and is persisted before the call returns,
//! so a crash loses at most the edit in flight and edits to one table
//! are applied strictly in submission order (the read-modify-write runs
//! inside a single write transaction).
//!
//! The manager holds no order state in memory; the pending-order store
//! is the sole source of truth across restarts.

use crate::catalog::CatalogService;
use crate::db::PosStorage;
use crate::sales::{Reservation, SaleCommitEngine, SaleError, StockValidator};
use shared::models::{LineItem, PaymentSplit, PendingOrder, Sale, Table};
use shared::util;

/// Orchestrates table sessions over the shared storage
#[derive(Clone)]
pub struct TableSessionManager {
    storage: PosStorage,
    catalog: CatalogService,
    validator: StockValidator,
    engine: SaleCommitEngine,
}

impl TableSessionManager {
    pub fn new(storage: PosStorage, catalog: CatalogService, engine: SaleCommitEngine) -> Self {
        let validator = StockValidator::new(storage.clone(), catalog.clone());
        Self {
            storage,
            catalog,
            validator,
            engine,
        }
    }

    // ========== Table lifecycle ==========

    /// Create a table with a fresh id
    pub fn create_table(&self, name: &str) -> Result<Table, SaleError> {
        let table = Table {
            id: util::new_id(),
            name: name.to_string(),
        };
        self.storage.upsert_table(&table)?;
        tracing::info!(table_id = %table.id, name = %table.name, "Table created");
        Ok(table)
    }

    /// Rename a table; a pending order carries the new name so the
    /// eventual sale snapshot is labeled with the current name.
    pub fn rename_table(&self, table_id: &str, new_name: &str) -> Result<Table, SaleError> {
        let mut table = self
            .storage
            .get_table(table_id)?
            .ok_or_else(|| SaleError::TableNotFound(table_id.to_string()))?;
        table.name = new_name.to_string();
        self.storage.upsert_table(&table)?;

        let txn = self.storage.begin_write()?;
        if let Some(mut order) = self.storage.get_pending_order_txn(&txn, table_id)? {
            order.table_name = new_name.to_string();
            order.last_modified = util::now_millis();
            self.storage.upsert_pending_order_txn(&txn, &order)?;
        }
        txn.commit().map_err(crate::db::StorageError::from)?;

        Ok(table)
    }

    /// Delete a table. Refused while a non-empty pending order exists;
    /// an empty pending record is removed along with the table.
    ///
    /// The emptiness check and the delete share one write transaction,
    /// so an add landing in between cannot have its order destroyed.
    pub fn delete_table(&self, table_id: &str) -> Result<(), SaleError> {
        let txn = self.storage.begin_write()?;
        if let Some(order) = self.storage.get_pending_order_txn(&txn, table_id)?
            && !order.is_empty()
        {
            return Err(SaleError::TableNotEmpty(table_id.to_string()));
        }
        let existed = self.storage.delete_table_txn(&txn, table_id)?;
        txn.commit().map_err(crate::db::StorageError::from)?;

        if !existed {
            return Err(SaleError::TableNotFound(table_id.to_string()));
        }
        tracing::info!(table_id = %table_id, "Table deleted");
        Ok(())
    }

    pub fn list_tables(&self) -> Result<Vec<Table>, SaleError> {
        Ok(self.storage.list_tables()?)
    }

    // ========== Pending order editing ==========

    /// Current pending order for a table, if any
    pub fn get_order(&self, table_id: &str) -> Result<Option<PendingOrder>, SaleError> {
        Ok(self.storage.get_pending_order(table_id)?)
    }

    /// All pending orders (availability listings)
    pub fn pending_orders(&self) -> Result<Vec<PendingOrder>, SaleError> {
        Ok(self.storage.list_pending_orders()?)
    }

    /// Advisory availability for a table considering other tables'
    /// in-flight reservations. Feedback only; finalize re-checks.
    pub fn check_reservable(
        &self,
        product_id: &str,
        requested: u32,
        table_id: &str,
    ) -> Result<Reservation, SaleError> {
        self.validator.check_reservable(product_id, requested, table_id)
    }

    /// Add `quantity` units of a product to the table's pending order.
    ///
    /// A product already on the order merges quantities into its
    /// existing line (keeping that line's price), and the advisory
    /// check runs against the merged total.
    pub fn add_line_item(
        &self,
        table_id: &str,
        product_id: &str,
        quantity: u32,
    ) -> Result<PendingOrder, SaleError> {
        if quantity == 0 {
            return Err(SaleError::InvalidLineItem(format!(
                "zero quantity for {product_id}"
            )));
        }
        let table = self
            .storage
            .get_table(table_id)?
            .ok_or_else(|| SaleError::TableNotFound(table_id.to_string()))?;
        let product = self
            .catalog
            .lookup(product_id)
            .ok_or_else(|| SaleError::ProductNotFound(product_id.to_string()))?;

        // Advisory gate on the merged quantity for this product
        let current = self.storage.get_pending_order(table_id)?;
        let merged = current
            .as_ref()
            .map(|o| o.quantity_of(product_id))
            .unwrap_or(0)
            .checked_add(quantity)
            .ok_or_else(|| {
                SaleError::InvalidLineItem(format!("quantity overflow for {product_id}"))
            })?;
        let reservation = self.validator.check_reservable(product_id, merged, table_id)?;
        if !reservation.ok {
            return Err(SaleError::InsufficientStock {
                product_id: product_id.to_string(),
                available: reservation.available,
                requested: merged,
            });
        }

        // Apply inside one write transaction so concurrent edits to the
        // same table cannot lose each other's lines
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_pending_order_txn(&txn, table_id)?
            .unwrap_or_else(|| PendingOrder::new(table_id, table.name.clone()));

        match order
            .line_items
            .iter_mut()
            .find(|item| item.product_id == product_id)
        {
            Some(item) => {
                item.quantity = item.quantity.checked_add(quantity).ok_or_else(|| {
                    SaleError::InvalidLineItem(format!("quantity overflow for {product_id}"))
                })?;
            }
            None => order.line_items.push(LineItem {
                product_id: product_id.to_string(),
                name: product.name.clone(),
                category_name: product.category_name.clone(),
                quantity,
                unit_price: product.sale_price,
            }),
        }
        order.last_modified = util::now_millis();
        self.storage.upsert_pending_order_txn(&txn, &order)?;
        txn.commit().map_err(crate::db::StorageError::from)?;

        tracing::debug!(
            table_id = %table_id,
            product_id = %product_id,
            quantity,
            "Line item added"
        );
        Ok(order)
    }

    /// Edit a line item's quantity and, optionally, its unit price
    /// (price corrections at the till).
    pub fn edit_line_item(
        &self,
        table_id: &str,
        product_id: &str,
        quantity: u32,
        unit_price: Option<i64>,
    ) -> Result<PendingOrder, SaleError> {
        if quantity == 0 {
            return Err(SaleError::InvalidLineItem(format!(
                "zero quantity for {product_id}"
            )));
        }
        if let Some(price) = unit_price
            && price < 0
        {
            return Err(SaleError::InvalidLineItem(format!(
                "negative unit price for {product_id}"
            )));
        }

        let reservation = self.validator.check_reservable(product_id, quantity, table_id)?;
        if !reservation.ok {
            return Err(SaleError::InsufficientStock {
                product_id: product_id.to_string(),
                available: reservation.available,
                requested: quantity,
            });
        }

        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_pending_order_txn(&txn, table_id)?
            .ok_or_else(|| SaleError::LineItemNotFound(product_id.to_string()))?;

        let item = order
            .line_items
            .iter_mut()
            .find(|item| item.product_id == product_id)
            .ok_or_else(|| SaleError::LineItemNotFound(product_id.to_string()))?;
        item.quantity = quantity;
        if let Some(price) = unit_price {
            item.unit_price = price;
        }
        order.last_modified = util::now_millis();
        self.storage.upsert_pending_order_txn(&txn, &order)?;
        txn.commit().map_err(crate::db::StorageError::from)?;

        Ok(order)
    }

    /// Remove a line item. The (possibly now empty) pending record is
    /// kept, so the table keeps its session until cancel or finalize.
    pub fn remove_line_item(
        &self,
        table_id: &str,
        product_id: &str,
    ) -> Result<PendingOrder, SaleError> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_pending_order_txn(&txn, table_id)?
            .ok_or_else(|| SaleError::LineItemNotFound(product_id.to_string()))?;

        let before = order.line_items.len();
        order.line_items.retain(|item| item.product_id != product_id);
        if order.line_items.len() == before {
            return Err(SaleError::LineItemNotFound(product_id.to_string()));
        }
        order.last_modified = util::now_millis();
        self.storage.upsert_pending_order_txn(&txn, &order)?;
        txn.commit().map_err(crate::db::StorageError::from)?;

        Ok(order)
    }

    /// Drop the pending order without touching stock
    pub fn cancel_order(&self, table_id: &str) -> Result<(), SaleError> {
        self.storage.delete_pending_order(table_id)?;
        tracing::info!(table_id = %table_id, "Pending order cancelled");
        Ok(())
    }

    // ========== Finalize ==========

    /// Convert the table's pending order into an immutable sale.
    ///
    /// Delegates the atomic commit to the engine, then refreshes the
    /// catalog cache since stock has changed. A refresh failure only
    /// leaves the cache stale and is logged, never surfaced.
    pub async fn finalize_order(
        &self,
        table_id: &str,
        split: PaymentSplit,
    ) -> Result<Sale, SaleError> {
        let order = self
            .storage
            .get_pending_order(table_id)?
            .ok_or(SaleError::EmptySale)?;

        let sale = self.engine.finalize(&order, split).await?;

        if let Err(err) = self.catalog.refresh() {
            tracing::warn!(error = %err, "Catalog refresh after commit failed, cache is stale");
        }
        Ok(sale)
    }
}
