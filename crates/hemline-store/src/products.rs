//! In-memory product store.

use hemline_commerce::catalog::{decrement_size, AdjustmentOutcome, Product, StockKey};
use hemline_commerce::error::CommerceError;
use hemline_commerce::ids::ProductId;
use hemline_commerce::store::ProductStore;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// Product store backed by a process-local map.
///
/// The whole map sits behind one `RwLock`, so [`decrement_stock`]
/// performs its lookup, clamp and write under a single write guard and
/// concurrent decrements of the same counter serialize instead of
/// racing a read-modify-write.
///
/// [`decrement_stock`]: ProductStore::decrement_stock
#[derive(Default)]
pub struct MemoryProductStore {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl MemoryProductStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a product, returning it if it existed.
    pub fn remove(&self, id: &ProductId) -> Result<Option<Product>, CommerceError> {
        let mut products = self
            .products
            .write()
            .map_err(|_| CommerceError::StorageError("product store lock poisoned".into()))?;
        Ok(products.remove(id))
    }

    /// Read one stock counter. `None` when any level of the key is
    /// missing.
    pub fn stock_at(&self, key: &StockKey) -> Result<Option<i64>, CommerceError> {
        let products = self
            .products
            .read()
            .map_err(|_| CommerceError::StorageError("product store lock poisoned".into()))?;
        Ok(products
            .get(&key.product_id)
            .and_then(|p| p.variant(&key.color))
            .and_then(|v| v.size(&key.size))
            .map(|s| s.stock))
    }
}

impl ProductStore for MemoryProductStore {
    fn product(&self, id: &ProductId) -> Result<Option<Product>, CommerceError> {
        let products = self
            .products
            .read()
            .map_err(|_| CommerceError::StorageError("product store lock poisoned".into()))?;
        Ok(products.get(id).cloned())
    }

    fn save_product(&self, product: Product) -> Result<(), CommerceError> {
        let mut products = self
            .products
            .write()
            .map_err(|_| CommerceError::StorageError("product store lock poisoned".into()))?;
        products.insert(product.id.clone(), product);
        Ok(())
    }

    fn decrement_stock(
        &self,
        key: &StockKey,
        quantity: i64,
    ) -> Result<AdjustmentOutcome, CommerceError> {
        let mut products = self
            .products
            .write()
            .map_err(|_| CommerceError::StorageError("product store lock poisoned".into()))?;
        let outcome = match products.get_mut(&key.product_id) {
            Some(product) => decrement_size(product, &key.color, &key.size, quantity),
            None => AdjustmentOutcome::SkippedMissingProduct,
        };
        debug!(key = %key, quantity, outcome = ?outcome, "stock decrement");
        Ok(outcome)
    }
}
