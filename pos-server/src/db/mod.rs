//! redb-based storage layer for the POS backend
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `products` | `product_id` | `Product` | Stock pool (single source of truth) |
//! | `pending_orders` | `table_id` | `PendingOrder` | One mutable order per table |
//! | `tables` | `table_id` | `Table` | Table identities |
//! | `sales` | `(timestamp, sale_id)` | `Sale` | Immutable sale log (append-only) |
//! | `counters` | `name` | `u64` | Receipt number counter |
//!
//! # Durability
//!
//! redb commits are persistent as soon as `commit()` returns, using
//! copy-on-write with an atomic pointer swap, so the database file is
//! always in a consistent state even across power loss. A crash loses
//! at most the last unsaved edit, never a half-applied finalize.
//!
//! # Isolation
//!
//! Write transactions are serialized: two overlapping finalize
//! attempts on shared products never both observe enough stock to
//! oversell, because the second transaction begins only after the
//! first has committed its decrements.

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use shared::models::{PendingOrder, Product, Sale, Table};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Products: key = product_id, value = JSON-serialized Product
const PRODUCTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("products");

/// Pending orders: key = table_id, value = JSON-serialized PendingOrder
const PENDING_ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("pending_orders");

/// Tables: key = table_id, value = JSON-serialized Table
const TABLES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("tables");

/// Sales: key = (commit timestamp millis, sale_id), value = JSON-serialized Sale
///
/// The timestamp leads the key so the reporting collaborator can range
/// scan a date window without a secondary index.
const SALES_TABLE: TableDefinition<(i64, &str), &[u8]> = TableDefinition::new("sales");

/// Counters: key = counter name, value = u64
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const RECEIPT_NUMBER_KEY: &str = "receipt_number";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    /// Whether a commit attempt hitting this error may be retried.
    ///
    /// Serialization failures are deterministic and will fail again;
    /// everything else (I/O, lock contention, commit failures) is
    /// transient from the caller's point of view.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, StorageError::Serialization(_))
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// POS storage backed by redb
///
/// Cheap to clone; all clones share the same database handle.
#[derive(Clone, Debug)]
pub struct PosStorage {
    db: Arc<Database>,
}

impl PosStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Create all tables so later reads never hit a missing table
    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(PRODUCTS_TABLE)?;
            let _ = write_txn.open_table(PENDING_ORDERS_TABLE)?;
            let _ = write_txn.open_table(TABLES_TABLE)?;
            let _ = write_txn.open_table(SALES_TABLE)?;

            let mut counters = write_txn.open_table(COUNTERS_TABLE)?;
            if counters.get(RECEIPT_NUMBER_KEY)?.is_none() {
                counters.insert(RECEIPT_NUMBER_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    ///
    /// redb serializes writers; this call blocks while another write
    /// transaction is open.
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Products ==========

    /// Upsert a product (inventory collaborator path, not the commit engine)
    pub fn put_product(&self, product: &Product) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PRODUCTS_TABLE)?;
            let value = serde_json::to_vec(product)?;
            table.insert(product.id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Get a product by id
    pub fn get_product(&self, product_id: &str) -> StorageResult<Option<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;

        match table.get(product_id)? {
            Some(value) => {
                let product: Product = serde_json::from_slice(value.value())?;
                Ok(Some(product))
            }
            None => Ok(None),
        }
    }

    /// Get all products (catalog refresh)
    pub fn list_products(&self) -> StorageResult<Vec<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;

        let mut products = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let product: Product = serde_json::from_slice(value.value())?;
            products.push(product);
        }
        Ok(products)
    }

    /// Get a product by id (within transaction)
    ///
    /// This is the authoritative read the commit engine validates
    /// against; it sees all writes already made in `txn`.
    pub fn get_product_txn(
        &self,
        txn: &WriteTransaction,
        product_id: &str,
    ) -> StorageResult<Option<Product>> {
        let table = txn.open_table(PRODUCTS_TABLE)?;

        match table.get(product_id)? {
            Some(value) => {
                let product: Product = serde_json::from_slice(value.value())?;
                Ok(Some(product))
            }
            None => Ok(None),
        }
    }

    /// Write a product (within transaction)
    pub fn put_product_txn(&self, txn: &WriteTransaction, product: &Product) -> StorageResult<()> {
        let mut table = txn.open_table(PRODUCTS_TABLE)?;
        let value = serde_json::to_vec(product)?;
        table.insert(product.id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Remove a product (inventory collaborator path; the commit
    /// engine never deletes products)
    pub fn delete_product(&self, product_id: &str) -> StorageResult<bool> {
        let txn = self.db.begin_write()?;
        let existed = {
            let mut table = txn.open_table(PRODUCTS_TABLE)?;
            table.remove(product_id)?.is_some()
        };
        txn.commit()?;
        Ok(existed)
    }

    // ========== Pending Orders ==========

    /// Get the pending order for a table
    pub fn get_pending_order(&self, table_id: &str) -> StorageResult<Option<PendingOrder>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_ORDERS_TABLE)?;

        match table.get(table_id)? {
            Some(value) => {
                let order: PendingOrder = serde_json::from_slice(value.value())?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    /// Get the pending order for a table (within transaction)
    pub fn get_pending_order_txn(
        &self,
        txn: &WriteTransaction,
        table_id: &str,
    ) -> StorageResult<Option<PendingOrder>> {
        let table = txn.open_table(PENDING_ORDERS_TABLE)?;

        match table.get(table_id)? {
            Some(value) => {
                let order: PendingOrder = serde_json::from_slice(value.value())?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    /// Persist a pending order, overwriting any previous state.
    ///
    /// Idempotent: re-saving identical content leaves exactly one
    /// record for the table.
    pub fn upsert_pending_order(&self, order: &PendingOrder) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        self.upsert_pending_order_txn(&txn, order)?;
        txn.commit()?;
        Ok(())
    }

    /// Persist a pending order (within transaction)
    pub fn upsert_pending_order_txn(
        &self,
        txn: &WriteTransaction,
        order: &PendingOrder,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PENDING_ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.table_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Remove the pending order for a table (no-op if absent)
    pub fn delete_pending_order(&self, table_id: &str) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        self.delete_pending_order_txn(&txn, table_id)?;
        txn.commit()?;
        Ok(())
    }

    /// Remove the pending order for a table (within transaction)
    pub fn delete_pending_order_txn(
        &self,
        txn: &WriteTransaction,
        table_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PENDING_ORDERS_TABLE)?;
        table.remove(table_id)?;
        Ok(())
    }

    /// Get all pending orders (reservation summing)
    pub fn list_pending_orders(&self) -> StorageResult<Vec<PendingOrder>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let order: PendingOrder = serde_json::from_slice(value.value())?;
            orders.push(order);
        }
        Ok(orders)
    }

    // ========== Tables ==========

    /// Upsert a table record
    pub fn upsert_table(&self, table_rec: &Table) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(TABLES_TABLE)?;
            let value = serde_json::to_vec(table_rec)?;
            table.insert(table_rec.id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Get a table by id
    pub fn get_table(&self, table_id: &str) -> StorageResult<Option<Table>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLES_TABLE)?;

        match table.get(table_id)? {
            Some(value) => {
                let rec: Table = serde_json::from_slice(value.value())?;
                Ok(Some(rec))
            }
            None => Ok(None),
        }
    }

    /// Remove a table record and its (empty) pending order together
    pub fn delete_table(&self, table_id: &str) -> StorageResult<bool> {
        let txn = self.db.begin_write()?;
        let existed = self.delete_table_txn(&txn, table_id)?;
        txn.commit()?;
        Ok(existed)
    }

    /// Remove a table record and its pending order (within transaction)
    ///
    /// Callers that must not destroy a non-empty order check it in the
    /// same transaction first.
    pub fn delete_table_txn(&self, txn: &WriteTransaction, table_id: &str) -> StorageResult<bool> {
        let existed = {
            let mut table = txn.open_table(TABLES_TABLE)?;
            table.remove(table_id)?.is_some()
        };
        self.delete_pending_order_txn(txn, table_id)?;
        Ok(existed)
    }

    /// Get all tables
    pub fn list_tables(&self) -> StorageResult<Vec<Table>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLES_TABLE)?;

        let mut tables = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let rec: Table = serde_json::from_slice(value.value())?;
            tables.push(rec);
        }
        Ok(tables)
    }

    // ========== Sales ==========

    /// Append an immutable sale record (within transaction)
    pub fn store_sale_txn(&self, txn: &WriteTransaction, sale: &Sale) -> StorageResult<()> {
        let mut table = txn.open_table(SALES_TABLE)?;
        let value = serde_json::to_vec(sale)?;
        table.insert((sale.timestamp, sale.id.as_str()), value.as_slice())?;
        Ok(())
    }

    /// Get sales committed in `[from, to]` (epoch millis, inclusive),
    /// ordered by timestamp
    pub fn list_sales_between(&self, from: i64, to: i64) -> StorageResult<Vec<Sale>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SALES_TABLE)?;

        let mut sales = Vec::new();
        for result in table.range((from, "")..)? {
            let (key, value) = result?;
            if key.value().0 > to {
                break;
            }
            let sale: Sale = serde_json::from_slice(value.value())?;
            sales.push(sale);
        }
        Ok(sales)
    }

    // ========== Counters ==========

    /// Increment and return the receipt number (within transaction)
    ///
    /// Runs inside the commit transaction so an aborted finalize never
    /// consumes a number.
    pub fn next_receipt_number_txn(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        let current = table
            .get(RECEIPT_NUMBER_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0);
        let next = current + 1;
        table.insert(RECEIPT_NUMBER_KEY, next)?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{LineItem, PaymentSplit, SaleStatus};
    use shared::util::now_millis;

    fn create_test_product(id: &str, stock: u32) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            category_id: "cat-1".to_string(),
            category_name: "Drinks".to_string(),
            stock_quantity: stock,
            cost_price: 3_000,
            sale_price: 5_000,
        }
    }

    fn create_test_order(table_id: &str) -> PendingOrder {
        let mut order = PendingOrder::new(table_id, format!("Mesa {table_id}"));
        order.line_items.push(LineItem {
            product_id: "p1".to_string(),
            name: "Cerveza".to_string(),
            category_name: "Drinks".to_string(),
            quantity: 2,
            unit_price: 5_000,
        });
        order
    }

    fn create_test_sale(id: &str, timestamp: i64) -> Sale {
        Sale {
            id: id.to_string(),
            receipt_number: 1,
            table_label: "Mesa 1".to_string(),
            line_items: vec![],
            total: 10_000,
            payment_split: PaymentSplit {
                cash: 10_000,
                ..Default::default()
            },
            status: SaleStatus::Paid,
            timestamp,
        }
    }

    #[test]
    fn test_product_roundtrip() {
        let storage = PosStorage::open_in_memory().unwrap();

        assert!(storage.get_product("p1").unwrap().is_none());

        let product = create_test_product("p1", 10);
        storage.put_product(&product).unwrap();

        let loaded = storage.get_product("p1").unwrap().unwrap();
        assert_eq!(loaded, product);
        assert_eq!(storage.list_products().unwrap().len(), 1);
    }

    #[test]
    fn test_pending_order_upsert_is_idempotent() {
        let storage = PosStorage::open_in_memory().unwrap();

        let order = create_test_order("t1");
        storage.upsert_pending_order(&order).unwrap();
        storage.upsert_pending_order(&order).unwrap();
        storage.upsert_pending_order(&order).unwrap();

        // Still exactly one record, with identical content
        let all = storage.list_pending_orders().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], order);
    }

    #[test]
    fn test_pending_order_delete() {
        let storage = PosStorage::open_in_memory().unwrap();

        let order = create_test_order("t1");
        storage.upsert_pending_order(&order).unwrap();
        assert!(storage.get_pending_order("t1").unwrap().is_some());

        storage.delete_pending_order("t1").unwrap();
        assert!(storage.get_pending_order("t1").unwrap().is_none());

        // Deleting a missing record is a no-op
        storage.delete_pending_order("t1").unwrap();
    }

    #[test]
    fn test_table_delete_removes_pending_record() {
        let storage = PosStorage::open_in_memory().unwrap();

        let table = Table {
            id: "t1".to_string(),
            name: "Mesa 1".to_string(),
        };
        storage.upsert_table(&table).unwrap();
        storage
            .upsert_pending_order(&PendingOrder::new("t1", "Mesa 1"))
            .unwrap();

        assert!(storage.delete_table("t1").unwrap());
        assert!(storage.get_table("t1").unwrap().is_none());
        assert!(storage.get_pending_order("t1").unwrap().is_none());

        // Second delete reports the record was already gone
        assert!(!storage.delete_table("t1").unwrap());
    }

    #[test]
    fn test_sales_range_query() {
        let storage = PosStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage.store_sale_txn(&txn, &create_test_sale("s1", 1_000)).unwrap();
        storage.store_sale_txn(&txn, &create_test_sale("s2", 2_000)).unwrap();
        storage.store_sale_txn(&txn, &create_test_sale("s3", 3_000)).unwrap();
        txn.commit().unwrap();

        let sales = storage.list_sales_between(1_500, 2_500).unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].id, "s2");

        let all = storage.list_sales_between(0, now_millis()).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, "s1");
        assert_eq!(all[2].id, "s3");
    }

    #[test]
    fn test_receipt_number_survives_only_committed_txns() {
        let storage = PosStorage::open_in_memory().unwrap();

        // Aborted transaction consumes nothing
        let txn = storage.begin_write().unwrap();
        let n = storage.next_receipt_number_txn(&txn).unwrap();
        assert_eq!(n, 1);
        txn.abort().unwrap();

        let txn = storage.begin_write().unwrap();
        let n = storage.next_receipt_number_txn(&txn).unwrap();
        assert_eq!(n, 1);
        txn.commit().unwrap();

        let txn = storage.begin_write().unwrap();
        let n = storage.next_receipt_number_txn(&txn).unwrap();
        assert_eq!(n, 2);
        txn.commit().unwrap();
    }

    #[test]
    fn test_txn_reads_see_txn_writes() {
        let storage = PosStorage::open_in_memory().unwrap();
        storage.put_product(&create_test_product("p1", 10)).unwrap();

        let txn = storage.begin_write().unwrap();
        let mut product = storage.get_product_txn(&txn, "p1").unwrap().unwrap();
        product.stock_quantity = 7;
        storage.put_product_txn(&txn, &product).unwrap();

        // Same transaction observes the decrement
        let reread = storage.get_product_txn(&txn, "p1").unwrap().unwrap();
        assert_eq!(reread.stock_quantity, 7);

        // Outside readers still see the committed value
        assert_eq!(storage.get_product("p1").unwrap().unwrap().stock_quantity, 10);

        txn.commit().unwrap();
        assert_eq!(storage.get_product("p1").unwrap().unwrap().stock_quantity, 7);
    }
}
