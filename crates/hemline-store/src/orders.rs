//! In-memory order store.

use hemline_commerce::error::CommerceError;
use hemline_commerce::ids::{OrderId, UserId};
use hemline_commerce::orders::Order;
use hemline_commerce::store::OrderStore;
use std::collections::HashMap;
use std::sync::RwLock;

/// Order store backed by a process-local map.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl MemoryOrderStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All orders placed by one user, newest first.
    pub fn orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, CommerceError> {
        let orders = self
            .orders
            .read()
            .map_err(|_| CommerceError::StorageError("order store lock poisoned".into()))?;
        let mut found: Vec<Order> = orders
            .values()
            .filter(|o| &o.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}

impl OrderStore for MemoryOrderStore {
    fn order(&self, id: &OrderId) -> Result<Option<Order>, CommerceError> {
        let orders = self
            .orders
            .read()
            .map_err(|_| CommerceError::StorageError("order store lock poisoned".into()))?;
        Ok(orders.get(id).cloned())
    }

    fn save_order(&self, order: Order) -> Result<(), CommerceError> {
        let mut orders = self
            .orders
            .write()
            .map_err(|_| CommerceError::StorageError("order store lock poisoned".into()))?;
        orders.insert(order.id.clone(), order);
        Ok(())
    }
}
