//! Catalog Service - in-memory product snapshot
//!
//! Holds a read-mostly cache of the product table so advisory checks
//! and listings never touch the database. There is no aging or partial
//! invalidation: the cache is reloaded wholesale by `refresh()`, which
//! the session manager calls after every committed sale (stock has
//! changed) and the API exposes on demand.
//!
//! The cache is advisory by construction. The commit engine never
//! reads it; authoritative stock always comes from the storage layer
//! inside the commit transaction.

use crate::db::{PosStorage, StorageResult};
use parking_lot::RwLock;
use shared::models::Product;
use std::collections::HashMap;
use std::sync::Arc;

/// Unified product cache service
#[derive(Clone)]
pub struct CatalogService {
    storage: PosStorage,
    /// Products cache: product_id -> Product
    products: Arc<RwLock<HashMap<String, Product>>>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("products", &self.products.read().len())
            .finish()
    }
}

impl CatalogService {
    pub fn new(storage: PosStorage) -> Self {
        Self {
            storage,
            products: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Reload all products from storage.
    ///
    /// On failure the previous snapshot is kept untouched, so callers
    /// may retry or keep serving stale data.
    pub fn refresh(&self) -> StorageResult<usize> {
        let loaded = self.storage.list_products()?;
        let count = loaded.len();

        let mut cache = self.products.write();
        cache.clear();
        for product in loaded {
            cache.insert(product.id.clone(), product);
        }

        tracing::debug!(products = count, "Catalog refreshed");
        Ok(count)
    }

    /// Look up a product by id
    pub fn lookup(&self, product_id: &str) -> Option<Product> {
        self.products.read().get(product_id).cloned()
    }

    /// All cached products, sorted by name for stable listings
    pub fn list(&self) -> Vec<Product> {
        let mut products: Vec<Product> = self.products.read().values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        products
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, stock: u32) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            category_id: "cat-1".to_string(),
            category_name: "Drinks".to_string(),
            stock_quantity: stock,
            cost_price: 3_000,
            sale_price: 5_000,
        }
    }

    #[test]
    fn test_refresh_and_lookup() {
        let storage = PosStorage::open_in_memory().unwrap();
        let catalog = CatalogService::new(storage.clone());

        // Empty before first refresh
        assert!(catalog.lookup("p1").is_none());

        storage.put_product(&product("p1", "Cerveza", 12)).unwrap();
        storage.put_product(&product("p2", "Aguardiente", 4)).unwrap();

        assert_eq!(catalog.refresh().unwrap(), 2);
        assert_eq!(catalog.lookup("p1").unwrap().stock_quantity, 12);

        let names: Vec<String> = catalog.list().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Aguardiente", "Cerveza"]);
    }

    #[test]
    fn test_refresh_drops_removed_products() {
        let storage = PosStorage::open_in_memory().unwrap();
        let catalog = CatalogService::new(storage.clone());

        storage.put_product(&product("p1", "Cerveza", 12)).unwrap();
        catalog.refresh().unwrap();
        assert!(catalog.lookup("p1").is_some());

        // Product vanishes from storage; the next refresh forgets it
        storage.delete_product("p1").unwrap();
        catalog.refresh().unwrap();
        assert!(catalog.lookup("p1").is_none());
    }

    #[test]
    fn test_lookup_is_a_point_in_time_snapshot() {
        let storage = PosStorage::open_in_memory().unwrap();
        let catalog = CatalogService::new(storage.clone());

        storage.put_product(&product("p1", "Cerveza", 12)).unwrap();
        catalog.refresh().unwrap();

        // Storage moves on; the cache stays at the refreshed value
        storage.put_product(&product("p1", "Cerveza", 3)).unwrap();
        assert_eq!(catalog.lookup("p1").unwrap().stock_quantity, 12);

        catalog.refresh().unwrap();
        assert_eq!(catalog.lookup("p1").unwrap().stock_quantity, 3);
    }
}
